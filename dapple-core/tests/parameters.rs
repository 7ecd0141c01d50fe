#[cfg(test)]
mod tests {
    use dapple_core::{Parameter, ParameterList, Parameters, Value, params};
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn named_parameters() {
        let params = params! { "@Id" => 1, ":Name" => "Alice", "$Active" => true };
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("Id"), Some(&Value::Int32(Some(1))));
        assert_eq!(params.get("@Name"), Some(&Value::Varchar(Some("Alice".into()))));
        assert_eq!(params.get("Active"), Some(&Value::Boolean(Some(true))));
        assert_eq!(params.get("Missing"), None);
        let names: Vec<_> = params.iter().map(|p| p.name.clone().unwrap()).collect();
        assert_eq!(names, ["Id", "Name", "Active"]);
    }

    #[test]
    fn add_replaces_existing() {
        let mut params = ParameterList::new();
        params.add("Value", 1).add("@Value", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Value"), Some(&Value::Int32(Some(2))));
    }

    #[test]
    fn positional_parameters() {
        let mut params = vec![Value::from(1), Value::from("two")].into_parameters();
        params.push(3.0);
        let collected: Vec<_> = params.into_iter().collect();
        assert_eq!(
            collected,
            [
                Parameter::positional(1),
                Parameter::positional("two"),
                Parameter::positional(3.0),
            ]
        );
    }

    #[test]
    fn parameter_objects() {
        assert!(().into_parameters().is_empty());
        assert!(Option::<ParameterList>::None.into_parameters().is_empty());
        let from_array = [("Value", "Test")].into_parameters();
        assert_eq!(from_array, params! { "Value" => "Test" });
        let from_vec = vec![("a", 1), ("b", 2)].into_parameters();
        assert_eq!(from_vec, params! { "a" => 1, "b" => 2 });
        let from_btree: BTreeMap<_, _> = [("b", 2i64), ("a", 1i64)].into_iter().collect();
        assert_eq!(
            from_btree.into_parameters(),
            params! { "a" => 1i64, "b" => 2i64 }
        );
        let from_hash: HashMap<_, _> = [("only".to_string(), Some(5i32))].into_iter().collect();
        assert_eq!(from_hash.into_parameters(), params! { "only" => 5 });
        let none: Option<i32> = None;
        assert_eq!(
            params! { "x" => none }.get("x"),
            Some(&Value::Int32(None))
        );
    }

    #[test]
    fn display() {
        let params = params! { "Id" => 1, "Name" => "O'Brien" };
        assert_eq!(params.to_string(), "[@Id = 1, @Name = 'O''Brien']");
        assert_eq!(ParameterList::new().to_string(), "[]");
    }
}
