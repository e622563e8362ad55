//! Arithmetic tools.

use serde_json::json;

use capability_hub::{
    Arguments, CapabilityDescriptor, CapabilityError, CapabilityResult, ParamSpec, ParamType,
    Payload,
};

/// Wrap a numeric result, refusing NaN and infinities (JSON cannot carry them).
fn number(value: f64) -> CapabilityResult<Payload> {
    if value.is_finite() {
        Ok(Payload::from(value))
    } else {
        Err(CapabilityError::handler("Result is not a finite number"))
    }
}

fn binary<F>(name: &str, title: &str, description: &str, op: F) -> CapabilityResult<CapabilityDescriptor>
where
    F: Fn(f64, f64) -> CapabilityResult<f64> + Send + Sync + 'static,
{
    CapabilityDescriptor::tool(name, move |_, args: Arguments| {
        number(op(args.f64("a")?, args.f64("b")?)?)
    })
    .title(title)
    .description(description)
    .param(ParamSpec::required("a", ParamType::Number).describe("First operand"))
    .param(ParamSpec::required("b", ParamType::Number).describe("Second operand"))
    .build()
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// BMI category boundaries: 18.5, 25 and 30.
pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

pub fn calculator_tools() -> CapabilityResult<Vec<CapabilityDescriptor>> {
    Ok(vec![
        binary("add", "Add Numbers", "Add two numbers together", |a, b| Ok(a + b))?,
        binary(
            "subtract",
            "Subtract Numbers",
            "Subtract second number from first",
            |a, b| Ok(a - b),
        )?,
        binary("multiply", "Multiply Numbers", "Multiply two numbers", |a, b| {
            Ok(a * b)
        })?,
        binary(
            "divide",
            "Divide Numbers",
            "Divide first number by second",
            |a, b| {
                if b == 0.0 {
                    return Err(CapabilityError::handler("Cannot divide by zero"));
                }
                Ok(a / b)
            },
        )?,
        binary(
            "power",
            "Calculate Power",
            "Calculate a raised to the power of b",
            |a, b| Ok(a.powf(b)),
        )?,
        CapabilityDescriptor::tool("sqrt", |_, args| {
            let x = args.f64("x")?;
            if x < 0.0 {
                return Err(CapabilityError::handler(
                    "Cannot calculate square root of negative number",
                ));
            }
            number(x.sqrt())
        })
        .title("Calculate Square Root")
        .description("Calculate square root of a number")
        .param(ParamSpec::required("x", ParamType::Number))
        .build()?,
        CapabilityDescriptor::tool("calculate_bmi", |_, args| {
            let weight_kg = args.f64("weight_kg")?;
            let height_m = args.f64("height_m")?;
            if weight_kg <= 0.0 || height_m <= 0.0 {
                return Err(CapabilityError::handler(
                    "Weight and height must be positive numbers",
                ));
            }

            let bmi = weight_kg / (height_m * height_m);
            Ok(Payload::Json(json!({
                "bmi": round2(bmi),
                "category": bmi_category(bmi),
                "weight_kg": weight_kg,
                "height_m": height_m,
            })))
        })
        .title("Calculate BMI")
        .description("Calculate Body Mass Index")
        .param(ParamSpec::required("weight_kg", ParamType::Number).describe("Weight in kilograms"))
        .param(ParamSpec::required("height_m", ParamType::Number).describe("Height in meters"))
        .build()?,
        CapabilityDescriptor::tool("percentage", |_, args| {
            number(args.f64("value")? * args.f64("percentage")? / 100.0)
        })
        .title("Calculate Percentage")
        .description("Calculate percentage of a number")
        .param(ParamSpec::required("value", ParamType::Number))
        .param(ParamSpec::required("percentage", ParamType::Number))
        .build()?,
        CapabilityDescriptor::tool("average", |_, args| {
            let numbers = args.f64_list("numbers")?;
            if numbers.is_empty() {
                return Err(CapabilityError::handler(
                    "Cannot calculate average of empty list",
                ));
            }
            number(numbers.iter().sum::<f64>() / numbers.len() as f64)
        })
        .title("Calculate Average")
        .description("Calculate average of a list of numbers")
        .param(ParamSpec::required(
            "numbers",
            ParamType::list_of(ParamType::Number),
        ))
        .build()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_boundaries() {
        assert_eq!(bmi_category(18.4), "Underweight");
        assert_eq!(bmi_category(18.5), "Normal weight");
        assert_eq!(bmi_category(25.0), "Overweight");
        assert_eq!(bmi_category(30.0), "Obese");
    }
}
