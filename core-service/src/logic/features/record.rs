//! Raw Record - Customer attributes as entered by the caller
//!
//! `RawInput` là dạng lỏng (JSON / form), `RawRecord` là dạng đã kiểm tra kiểu.
//! Categorical labels MUST match the training-time labels byte for byte.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// CATEGORICAL FIELDS
// ============================================================================

macro_rules! category_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Column name used at training time
            pub const FIELD: &'static str = $field;

            /// All known values, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Training-time category label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = PipelineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(PipelineError::unknown_category($field, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

category_enum! {
    /// Customer location
    Location, "Location", {
        Urban => "Urban",
        Rural => "Rural",
        Suburban => "Suburban",
    }
}

category_enum! {
    /// Dominant usage period
    TimeOfUse, "Time_of_Use", {
        Day => "Day",
        Night => "Night",
    }
}

category_enum! {
    PaymentMethod, "Payment_Method", {
        Cash => "Cash",
        CreditCard => "Credit Card",
        DebitCard => "Debit Card",
    }
}

category_enum! {
    ConsumptionType, "Consumption_Type", {
        Residential => "Residential",
        Commercial => "Commercial",
    }
}

// ============================================================================
// RAW RECORD (typed)
// ============================================================================

/// One customer's attributes, validated and typed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub age: f64,
    /// kWh
    pub energy_consumption: f64,
    pub previous_bills: f64,
    /// °C
    pub average_temperature: f64,
    pub location: Location,
    pub time_of_use: TimeOfUse,
    pub payment_method: PaymentMethod,
    pub consumption_type: ConsumptionType,
}

impl RawRecord {
    /// Check numeric domain constraints
    pub fn validate(&self) -> PipelineResult<()> {
        non_negative("Age", self.age)?;
        non_negative("Energy_Consumption", self.energy_consumption)?;
        non_negative("Previous_Bills", self.previous_bills)?;
        finite("Average_Temperature", self.average_temperature)?;
        Ok(())
    }

    /// Passthrough column (not normalized)
    pub fn passthrough_values(&self) -> [f64; 1] {
        [self.age]
    }

    /// Values for the numeric normalizer, in `NUMERIC_COLUMNS` order
    pub fn numeric_values(&self) -> [f64; 3] {
        [
            self.energy_consumption,
            self.previous_bills,
            self.average_temperature,
        ]
    }

    /// Labels for the categorical encoder, in `CATEGORICAL_COLUMNS` order
    pub fn categorical_values(&self) -> [&'static str; 4] {
        [
            self.location.as_str(),
            self.time_of_use.as_str(),
            self.payment_method.as_str(),
            self.consumption_type.as_str(),
        ]
    }

    /// Parse a JSON object keyed by the training column names
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let input = RawInput::from_json(json)?;
        Self::try_from(input)
    }
}

fn finite(field: &str, value: f64) -> PipelineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::schema(field, "not a finite number"))
    }
}

fn non_negative(field: &str, value: f64) -> PipelineResult<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(PipelineError::schema(field, format!("out of range: {} < 0", value)));
    }
    Ok(())
}

// ============================================================================
// RAW INPUT (loosely typed)
// ============================================================================

/// Record as received from a form or an HTTP body. Every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(rename = "Age", default)]
    pub age: Option<f64>,
    #[serde(rename = "Energy_Consumption", default)]
    pub energy_consumption: Option<f64>,
    #[serde(rename = "Previous_Bills", default)]
    pub previous_bills: Option<f64>,
    #[serde(rename = "Average_Temperature", default)]
    pub average_temperature: Option<f64>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Time_of_Use", default)]
    pub time_of_use: Option<String>,
    #[serde(rename = "Payment_Method", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "Consumption_Type", default)]
    pub consumption_type: Option<String>,
}

const NUMERIC_FIELDS: &[&str] = &[
    "Age",
    "Energy_Consumption",
    "Previous_Bills",
    "Average_Temperature",
];

const TEXT_FIELDS: &[&str] = &[
    "Location",
    "Time_of_Use",
    "Payment_Method",
    "Consumption_Type",
];

impl RawInput {
    /// Parse from JSON, reporting type mismatches per field
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| PipelineError::schema("<record>", format!("invalid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> PipelineResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PipelineError::schema("<record>", "wrong type: expected object"))?;

        for &field in NUMERIC_FIELDS {
            match object.get(field) {
                None | Some(serde_json::Value::Null) | Some(serde_json::Value::Number(_)) => {}
                Some(_) => return Err(PipelineError::schema(field, "wrong type: expected number")),
            }
        }
        for &field in TEXT_FIELDS {
            match object.get(field) {
                None | Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) => {}
                Some(_) => return Err(PipelineError::schema(field, "wrong type: expected string")),
            }
        }

        serde_json::from_value(value.clone())
            .map_err(|e| PipelineError::schema("<record>", e.to_string()))
    }
}

fn required<T>(field: &str, value: Option<T>) -> PipelineResult<T> {
    value.ok_or_else(|| PipelineError::schema(field, "missing"))
}

impl TryFrom<RawInput> for RawRecord {
    type Error = PipelineError;

    fn try_from(input: RawInput) -> Result<Self, Self::Error> {
        let record = RawRecord {
            age: required("Age", input.age)?,
            energy_consumption: required("Energy_Consumption", input.energy_consumption)?,
            previous_bills: required("Previous_Bills", input.previous_bills)?,
            average_temperature: required("Average_Temperature", input.average_temperature)?,
            location: required(Location::FIELD, input.location)?.parse()?,
            time_of_use: required(TimeOfUse::FIELD, input.time_of_use)?.parse()?,
            payment_method: required(PaymentMethod::FIELD, input.payment_method)?.parse()?,
            consumption_type: required(ConsumptionType::FIELD, input.consumption_type)?.parse()?,
        };
        record.validate()?;
        Ok(record)
    }
}

impl From<&RawRecord> for RawInput {
    fn from(record: &RawRecord) -> Self {
        RawInput {
            age: Some(record.age),
            energy_consumption: Some(record.energy_consumption),
            previous_bills: Some(record.previous_bills),
            average_temperature: Some(record.average_temperature),
            location: Some(record.location.as_str().to_string()),
            time_of_use: Some(record.time_of_use.as_str().to_string()),
            payment_method: Some(record.payment_method.as_str().to_string()),
            consumption_type: Some(record.consumption_type.as_str().to_string()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawRecord {
        RawRecord {
            age: 35.0,
            energy_consumption: 1500.0,
            previous_bills: 50.0,
            average_temperature: 32.0,
            location: Location::Urban,
            time_of_use: TimeOfUse::Night,
            payment_method: PaymentMethod::Cash,
            consumption_type: ConsumptionType::Residential,
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(PaymentMethod::CreditCard.as_str(), "Credit Card");
        assert_eq!("Debit Card".parse::<PaymentMethod>(), Ok(PaymentMethod::DebitCard));
        assert_eq!(Location::ALL.len(), 3);
        assert_eq!(TimeOfUse::FIELD, "Time_of_Use");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "Metropolis".parse::<Location>().unwrap_err();
        assert_eq!(err, PipelineError::unknown_category("Location", "Metropolis"));

        // Case-sensitive
        assert!("urban".parse::<Location>().is_err());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(sample().validate().is_ok());

        let mut record = sample();
        record.age = -1.0;
        assert!(matches!(record.validate(), Err(PipelineError::Schema { field, .. }) if field == "Age"));

        let mut record = sample();
        record.average_temperature = -12.5;
        assert!(record.validate().is_ok());

        let mut record = sample();
        record.energy_consumption = f64::NAN;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_try_from_missing_field() {
        let mut input = RawInput::from(&sample());
        input.previous_bills = None;

        let err = RawRecord::try_from(input).unwrap_err();
        assert_eq!(err, PipelineError::schema("Previous_Bills", "missing"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "Age": 40, "Energy_Consumption": 220, "Location": "Suburban",
            "Time_of_Use": "Day", "Previous_Bills": 240, "Average_Temperature": 25,
            "Payment_Method": "Credit Card", "Consumption_Type": "Residential"
        }"#;
        let record = RawRecord::from_json(json).unwrap();
        assert_eq!(record.location, Location::Suburban);
        assert_eq!(record.payment_method, PaymentMethod::CreditCard);
        assert_eq!(record.numeric_values(), [220.0, 240.0, 25.0]);
    }

    #[test]
    fn test_from_json_wrong_type() {
        let json = r#"{"Age": "thirty-five", "Energy_Consumption": 1500}"#;
        let err = RawRecord::from_json(json).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref field, .. } if field == "Age"));

        let json = r#"{"Age": 35, "Location": 3}"#;
        let err = RawInput::from_json(json).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref field, .. } if field == "Location"));
    }

    #[test]
    fn test_categorical_values_order() {
        assert_eq!(
            sample().categorical_values(),
            ["Urban", "Night", "Cash", "Residential"]
        );
    }
}
