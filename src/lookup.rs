//! Null-safe navigation over `serde_json::Value` trees.
//!
//! Every step tolerates a missing or mistyped node and carries `None`
//! forward, so a chain like `Lookup::new(&v).key("Taxable").key("TaxableInfos").first()`
//! never fails; the leaf simply resolves to null.

use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a>(Option<&'a Value>);

impl<'a> Lookup<'a> {
    pub fn new(value: &'a Value) -> Self {
        Lookup(Some(value))
    }

    pub fn key(self, name: &str) -> Self {
        Lookup(self.0.and_then(|v| v.get(name)).filter(|v| !v.is_null()))
    }

    /// First element of an array node.
    pub fn first(self) -> Self {
        Lookup(self.0.and_then(Value::as_array).and_then(|a| a.first()))
    }

    /// Elements of an array node; empty for anything else.
    pub fn items(self) -> impl Iterator<Item = Lookup<'a>> {
        self.0
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|v| Lookup(Some(v)))
    }

    pub fn get(self) -> Option<&'a Value> {
        self.0
    }

    /// Leaf value cloned, `Value::Null` when absent.
    pub fn value(self) -> Value {
        self.0.cloned().unwrap_or(Value::Null)
    }

    /// Leaf rendered as text. Strings come back verbatim, numbers and
    /// booleans through their JSON form; objects, arrays and null are `None`.
    pub fn text(self) -> Option<String> {
        match self.0? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Python-style truthiness of the node.
    pub fn truthy(self) -> bool {
        match self.0 {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_levels_resolve_to_null() {
        let v = json!({ "PropertyInfo": { "DORCode": "0101" } });
        assert_eq!(Lookup::new(&v).key("PropertyInfo").key("DORCode").text().as_deref(), Some("0101"));
        assert_eq!(Lookup::new(&v).key("Building").key("BuildingInfos").first().key("Actual").value(), Value::Null);
        assert!(Lookup::new(&v).key("PropertyInfo").key("DORCode").key("deeper").get().is_none());
    }

    #[test]
    fn first_of_empty_list_is_null() {
        let v = json!({ "Taxable": { "TaxableInfos": [] } });
        let first = Lookup::new(&v).key("Taxable").key("TaxableInfos").first();
        assert!(first.get().is_none());
        assert_eq!(first.key("SchoolTaxableValue").value(), Value::Null);
    }

    #[test]
    fn numbers_render_as_text() {
        let v = json!({ "ZipCode": 33131, "Name": null });
        assert_eq!(Lookup::new(&v).key("ZipCode").text().as_deref(), Some("33131"));
        assert_eq!(Lookup::new(&v).key("Name").text(), None);
    }

    #[test]
    fn truthiness_follows_json_emptiness() {
        let v = json!({ "a": true, "b": false, "c": [], "d": [1], "e": {}, "f": "" });
        let l = Lookup::new(&v);
        assert!(l.key("a").truthy());
        assert!(!l.key("b").truthy());
        assert!(!l.key("c").truthy());
        assert!(l.key("d").truthy());
        assert!(!l.key("e").truthy());
        assert!(!l.key("f").truthy());
        assert!(!l.key("missing").truthy());
    }

    #[test]
    fn items_iterates_arrays_only() {
        let v = json!({ "OwnerInfos": [{ "Name": "A" }, { "Name": "B" }], "Other": 3 });
        let names: Vec<_> = Lookup::new(&v).key("OwnerInfos").items().map(|o| o.key("Name").text()).collect();
        assert_eq!(names, vec![Some("A".to_string()), Some("B".to_string())]);
        assert_eq!(Lookup::new(&v).key("Other").items().count(), 0);
    }
}
