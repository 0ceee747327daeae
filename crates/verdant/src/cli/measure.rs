//! `list` and `describe` commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use verdant_model::{builtin_registry, BuildingModel};
use verdant_runner::{Measure, MeasureRegistry};
use verdant_schema::Argument;

use super::error::HelpfulError;
use super::output::print_table;

#[derive(Debug)]
pub struct DescribeArgs {
    pub measure: String,
    pub model: Option<PathBuf>,
    pub json: bool,
}

/// Look up a measure, turning a miss into a helpful error.
pub fn create_measure(
    registry: &MeasureRegistry<BuildingModel>,
    key: &str,
) -> Result<Box<dyn Measure<BuildingModel>>> {
    registry
        .create(key)
        .map_err(|_| HelpfulError::unknown_measure(key, &registry.keys()).into())
}

/// Load a model, turning failures into a helpful error.
pub fn load_model(path: &std::path::Path) -> Result<BuildingModel> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    BuildingModel::load(path).map_err(|e| HelpfulError::invalid_model(path, &e.to_string()).into())
}

/// `(key, description, argument count)` per registered measure, built
/// against an empty model.
fn list_entries(registry: &MeasureRegistry<BuildingModel>) -> Result<Vec<(String, String, usize)>> {
    let model = BuildingModel::default();
    registry
        .keys()
        .into_iter()
        .map(|key| -> Result<(String, String, usize)> {
            let measure = create_measure(registry, key)?;
            let schema = measure
                .arguments(&model)
                .with_context(|| format!("Measure '{}' declares invalid arguments", key))?;
            Ok((key.to_string(), measure.description().to_string(), schema.len()))
        })
        .collect()
}

pub fn run_list(json: bool) -> Result<()> {
    let registry = builtin_registry()?;
    let entries = list_entries(&registry)?;

    if json {
        let payload: Vec<_> = entries
            .iter()
            .map(|(key, description, count)| {
                serde_json::json!({
                    "key": key,
                    "description": description,
                    "arguments": count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let rows = entries
            .into_iter()
            .map(|(key, description, count)| vec![key, description, count.to_string()])
            .collect();
        print_table(&["MEASURE", "DESCRIPTION", "ARGS"], rows);
    }
    Ok(())
}

pub fn run_describe(args: DescribeArgs) -> Result<()> {
    let registry = builtin_registry()?;
    let measure = create_measure(&registry, &args.measure)?;
    let model = match &args.model {
        Some(path) => load_model(path)?,
        None => BuildingModel::default(),
    };
    let schema = measure.arguments(&model)?;

    if args.json {
        let payload = serde_json::json!({
            "key": args.measure,
            "description": measure.description(),
            "arguments": schema,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", args.measure);
    println!("{}", measure.description());
    println!();
    if schema.is_empty() {
        println!("(no arguments)");
        return Ok(());
    }

    let rows = schema.list().iter().map(argument_row).collect();
    print_table(
        &["NAME", "TYPE", "REQUIRED", "DEFAULT", "ALLOWED", "UNITS"],
        rows,
    );
    Ok(())
}

fn argument_row(arg: &Argument) -> Vec<String> {
    let allowed = if !arg.choices.is_empty() {
        arg.choices.join(" | ")
    } else if let Some(domain) = arg.domain {
        format!("[{}, {}]", domain.low, domain.high)
    } else {
        String::new()
    };

    vec![
        arg.name.clone(),
        arg.arg_type.to_string(),
        if arg.required && !arg.has_default() { "yes" } else { "no" }.to_string(),
        arg.default_value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default(),
        allowed,
        arg.units.clone().unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_runner::{MeasureError, Runner};
    use verdant_schema::{ArgumentSchema, Arguments, SchemaError};

    #[test]
    fn test_argument_row_shows_domain_and_default() {
        let arg = Argument::double("pct").with_domain(0.0, 100.0).with_default(30.0);
        let row = argument_row(&arg);
        assert_eq!(row[0], "pct");
        assert_eq!(row[2], "no");
        assert_eq!(row[3], "30");
        assert_eq!(row[4], "[0, 100]");
    }

    struct BrokenSchema;

    impl Measure<BuildingModel> for BrokenSchema {
        fn name(&self) -> &str {
            "broken_schema"
        }

        fn arguments(&self, _model: &BuildingModel) -> Result<ArgumentSchema, SchemaError> {
            ArgumentSchema::new()
                .with(Argument::double("x"))?
                .with(Argument::double("x"))
        }

        fn run(
            &self,
            _model: &mut BuildingModel,
            _runner: &mut Runner<'_>,
            _arguments: &Arguments<'_>,
        ) -> Result<bool, MeasureError> {
            Ok(true)
        }
    }

    #[test]
    fn test_list_entries_counts_arguments() {
        let registry = builtin_registry().unwrap();
        let entries = list_entries(&registry).unwrap();
        let lighting = entries
            .iter()
            .find(|(key, _, _)| key == "reduce_lighting_loads_by_percentage")
            .unwrap();
        assert_eq!(lighting.2, 1);
    }

    #[test]
    fn test_list_entries_surfaces_schema_error() {
        let mut registry = MeasureRegistry::new();
        registry.register("broken_schema", || Box::new(BrokenSchema)).unwrap();

        let err = list_entries(&registry).unwrap_err();
        assert!(err.to_string().contains("broken_schema"));
        assert!(err.downcast_ref::<SchemaError>().is_some());
    }

    #[test]
    fn test_unknown_measure_is_helpful() {
        let registry = builtin_registry().unwrap();
        let err = create_measure(&registry, "nope").err().unwrap();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
    }
}
