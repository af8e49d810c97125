//! Validation rules consumed by the parser.
//!
//! The parser delegates every name-legality judgement here: binding and
//! assignment targets, parameter lists, duplicate object-literal property
//! names, and duplicate class elements. Keeping the rules on one dedicated
//! type keeps the grammar functions free of policy.

use rustc_hash::FxHashMap;

/// What a property name was used as inside an object literal or class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Data,
    Get,
    Set,
}

/// Outcome of adding a property name to a [`DuplicateMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateOutcome {
    /// No conflict.
    Ok,
    /// Data/data repetition: an error only in strict code; the parser
    /// defers it because a later directive can still make the body strict.
    StrictOnly,
}

pub struct Validator;

impl Validator {
    /// Check an identifier used as a declaration target. In strict mode
    /// `eval` and `arguments` cannot be bound.
    pub fn binding_ident(&self, name: &str, strict: bool) -> Result<(), String> {
        if strict && (name == "eval" || name == "arguments") {
            return Err(format!("cannot bind `{name}` in strict mode"));
        }
        Ok(())
    }

    /// Check an identifier used as an assignment target.
    pub fn assign_target(&self, name: &str, strict: bool) -> Result<(), String> {
        if strict && (name == "eval" || name == "arguments") {
            return Err(format!("cannot assign to `{name}` in strict mode"));
        }
        Ok(())
    }

    /// Check a parameter name list under strict rules: no duplicates, no
    /// `eval`/`arguments`. Called when the enclosing function is (or has
    /// retroactively become) strict.
    pub fn check_parameters(&self, names: &[String]) -> Result<(), String> {
        let mut seen = FxHashMap::default();
        for name in names {
            if name == "eval" || name == "arguments" {
                return Err(format!("parameter cannot be named `{name}` in strict mode"));
            }
            if seen.insert(name.as_str(), ()).is_some() {
                return Err(format!("duplicate parameter name `{name}` in strict mode"));
            }
        }
        Ok(())
    }
}

/// Duplicate-name tracking for one object literal or one side (instance or
/// static) of a class body.
///
/// The matrix: data+data is fine outside strict code and an error inside it;
/// a getter and a setter for the same name coexist; repeating the same
/// accessor kind is an error; mixing a data property with an accessor is an
/// error.
#[derive(Default)]
pub struct DuplicateMap {
    seen: FxHashMap<String, u8>,
}

const F_DATA: u8 = 1;
const F_GET: u8 = 2;
const F_SET: u8 = 4;

impl DuplicateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a property name. Returns the outcome, or an error message for
    /// hard conflicts.
    pub fn add(&mut self, name: &str, kind: PropKind) -> Result<DuplicateOutcome, String> {
        let flag = match kind {
            PropKind::Data => F_DATA,
            PropKind::Get => F_GET,
            PropKind::Set => F_SET,
        };
        let entry = self.seen.entry(name.to_string()).or_insert(0);
        let prior = *entry;
        *entry |= flag;
        if prior == 0 {
            return Ok(DuplicateOutcome::Ok);
        }
        match kind {
            PropKind::Data if prior == F_DATA => Ok(DuplicateOutcome::StrictOnly),
            PropKind::Data => Err(format!("property `{name}` conflicts with an accessor")),
            PropKind::Get if prior == F_SET => Ok(DuplicateOutcome::Ok),
            PropKind::Set if prior == F_GET => Ok(DuplicateOutcome::Ok),
            PropKind::Get | PropKind::Set if prior & F_DATA != 0 => {
                Err(format!("accessor `{name}` conflicts with a data property"))
            }
            PropKind::Get => Err(format!("duplicate getter for `{name}`")),
            PropKind::Set => Err(format!("duplicate setter for `{name}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_ident_strict_rules() {
        let v = Validator;
        assert!(v.binding_ident("x", true).is_ok());
        assert!(v.binding_ident("eval", false).is_ok());
        assert!(v.binding_ident("eval", true).is_err());
        assert!(v.binding_ident("arguments", true).is_err());
    }

    #[test]
    fn parameters_reject_duplicates() {
        let v = Validator;
        assert!(v.check_parameters(&["a".into(), "b".into()]).is_ok());
        assert!(v.check_parameters(&["a".into(), "a".into()]).is_err());
        assert!(v.check_parameters(&["arguments".into()]).is_err());
    }

    #[test]
    fn duplicate_matrix_data_data() {
        let mut m = DuplicateMap::new();
        assert_eq!(m.add("x", PropKind::Data).unwrap(), DuplicateOutcome::Ok);
        assert_eq!(
            m.add("x", PropKind::Data).unwrap(),
            DuplicateOutcome::StrictOnly
        );
    }

    #[test]
    fn duplicate_matrix_get_set_pairs() {
        let mut m = DuplicateMap::new();
        assert!(m.add("x", PropKind::Get).is_ok());
        assert_eq!(m.add("x", PropKind::Set).unwrap(), DuplicateOutcome::Ok);
        assert!(m.add("x", PropKind::Get).is_err());
        assert!(m.add("x", PropKind::Set).is_err());
    }

    #[test]
    fn duplicate_matrix_data_accessor_conflicts() {
        let mut m = DuplicateMap::new();
        assert!(m.add("x", PropKind::Data).is_ok());
        assert!(m.add("x", PropKind::Get).is_err());

        let mut m = DuplicateMap::new();
        assert!(m.add("y", PropKind::Set).is_ok());
        assert!(m.add("y", PropKind::Data).is_err());
    }
}
