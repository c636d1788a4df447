use loan_store::Selector;
use loan_types::{EntityKind, DISCRIMINATOR_FIELD};

/// Build a selector for documents of `kind` matching every predicate.
///
/// The discriminator always comes first. Values are carried as data, so no
/// argument can widen or rewrite the query.
pub fn build_selector<'a>(
    kind: EntityKind,
    predicates: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Selector {
    let mut selector = Selector::new().where_eq(DISCRIMINATOR_FIELD, kind.as_str());
    for (field, value) in predicates {
        selector = selector.where_eq(field, value);
    }
    selector
}

/// Pair an operation's predicate fields with its leading arguments.
///
/// Arguments beyond `fields.len()` are ignored; callers check the minimum
/// count beforehand.
pub fn selector_from_args(kind: EntityKind, fields: &[&str], args: &[String]) -> Selector {
    build_selector(
        kind,
        fields.iter().copied().zip(args.iter().map(String::as_str)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn kind_only() {
        let selector = selector_from_args(EntityKind::Lender, &[], &[]);
        assert_eq!(selector.to_string(), r#"{"selector":{"Type":"lender"}}"#);
    }

    #[test]
    fn lender_by_credentials() {
        let selector = selector_from_args(
            EntityKind::Lender,
            &["username", "password"],
            &args(&["alice", "secret"]),
        );
        assert_eq!(
            selector.to_string(),
            r#"{"selector":{"Type":"lender","username":"alice","password":"secret"}}"#
        );
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let selector = selector_from_args(
            EntityKind::Request,
            &["requestID"],
            &args(&["R1", "ignored", "also ignored"]),
        );
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.value_of("requestID"), Some("R1"));
    }

    #[test]
    fn same_inputs_render_byte_identical() {
        let a = selector_from_args(EntityKind::Request, &["status", "lenderID"], &args(&["open", "L1"]));
        let b = selector_from_args(EntityKind::Request, &["status", "lenderID"], &args(&["open", "L1"]));
        assert_eq!(a.to_query_string().unwrap(), b.to_query_string().unwrap());
    }

    #[test]
    fn quote_in_value_stays_inside_value() {
        let selector = selector_from_args(
            EntityKind::Lender,
            &["username"],
            &args(&[r#"alice","Type":"lendee"#]),
        );
        assert_eq!(selector.value_of("Type"), Some("lender"));
        assert_eq!(selector.len(), 2);
    }
}
