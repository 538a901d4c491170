//! JSON schema generation for [`recipe_model::Recipe`], sent to the model
//! so it can be asked for schema-conformant output directly.

use recipe_model::Recipe;
use schemars::schema_for;
use serde_json::Value;

pub fn recipe_json_schema() -> Value {
    let schema = schema_for!(Recipe);
    serde_json::to_value(schema).expect("schemars output is always valid json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_describes_required_fields() {
        let schema = recipe_json_schema();
        assert!(schema.get("properties").is_some());
    }
}
