//! Unit-of-measure references.
//!
//! Two parameterizations are understood:
//!
//! - `USO` scale/offset: `SI = scale * (x - offset)`
//! - `UAD` Energistics ABCD: `SI = (a + b * x) / (c + d * x)`, linear only
//!
//! A bare `UM` measurement reference means values are already expressed in
//! the measurement's base unit.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    ReferenceError, ReferenceType, canonicalize, number_field, reference_type, string_field,
};

const BASE_MEASUREMENT_FIELD: &str = "baseMeasurement";
const BASE_SYMBOL_FIELD: &str = "baseSymbol";
const SCALE_OFFSET_FIELD: &str = "scaleOffset";
const ABCD_FIELD: &str = "abcd";
const ANCESTRY_FIELD: &str = "ancestry";
const SYMBOL_FIELD: &str = "symbol";

/// A parsed unit reference with its linear conversion to SI.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDescriptor {
    pub symbol: Option<String>,
    pub scale_to_si: f64,
    pub offset_to_si: f64,
    pub base_symbol: String,
    pub base_measurement: Option<Value>,
}

impl UnitDescriptor {
    /// Parse a persistable unit reference (string or object form).
    pub fn parse(reference: &Value) -> Result<Self, ReferenceError> {
        let reference = canonicalize(reference)?;
        let reference_type = reference_type(&reference)?;
        let (scale_to_si, offset_to_si, base_measurement) = match reference_type {
            ReferenceType::ScaleOffsetUnit => {
                let (scale, offset) = scale_offset(&reference)?;
                (scale, -offset * scale, reference.get(BASE_MEASUREMENT_FIELD))
            }
            ReferenceType::AbcdUnit => {
                let (scale, offset) = abcd(&reference)?;
                (scale, offset, reference.get(BASE_MEASUREMENT_FIELD))
            }
            ReferenceType::Measurement => (1.0, 0.0, None),
            other => {
                return Err(ReferenceError::WrongGrammar {
                    expected: "unit",
                    found: other.code().to_string(),
                });
            }
        };

        if scale_to_si == 0.0 || !scale_to_si.is_finite() || !offset_to_si.is_finite() {
            return Err(ReferenceError::InvalidField {
                field: SCALE_OFFSET_FIELD,
                reason: "conversion to SI is not a finite, non-degenerate mapping".to_string(),
            });
        }

        let base_measurement = match reference_type {
            ReferenceType::Measurement => Some(Value::Object(reference.clone())),
            _ => base_measurement.filter(|v| !v.is_null()).cloned(),
        };
        let base_symbol = match string_field(&reference, BASE_SYMBOL_FIELD)? {
            Some(symbol) => symbol.to_string(),
            None => base_measurement
                .as_ref()
                .and_then(|m| m.get(ANCESTRY_FIELD))
                .and_then(Value::as_str)
                .and_then(base_symbol_for_ancestry)
                .map(str::to_string)
                .ok_or(ReferenceError::MissingField(BASE_SYMBOL_FIELD))?,
        };

        Ok(Self {
            symbol: string_field(&reference, SYMBOL_FIELD)?.map(str::to_string),
            scale_to_si,
            offset_to_si,
            base_symbol,
            base_measurement,
        })
    }

    pub fn to_si(&self, value: f64) -> f64 {
        value * self.scale_to_si + self.offset_to_si
    }

    /// The serialized reference of this unit's SI base unit.
    pub fn base_reference(&self) -> String {
        let reference = BaseReference {
            base_measurement: self.base_measurement.as_ref(),
            scale_offset: ScaleOffset {
                offset: 0.0,
                scale: 1.0,
            },
            symbol: &self.base_symbol,
            reference_type: ReferenceType::ScaleOffsetUnit.code(),
        };
        serde_json::to_string(&reference).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ScaleOffset {
    offset: f64,
    scale: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BaseReference<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_measurement: Option<&'a Value>,
    scale_offset: ScaleOffset,
    symbol: &'a str,
    #[serde(rename = "type")]
    reference_type: &'static str,
}

/// Scale and offset, from `scaleOffset` or from top-level fields.
fn scale_offset(reference: &Map<String, Value>) -> Result<(f64, f64), ReferenceError> {
    match reference.get(SCALE_OFFSET_FIELD) {
        Some(Value::Object(params)) => {
            Ok((number_field(params, "scale")?, number_field(params, "offset")?))
        }
        Some(_) => Err(ReferenceError::InvalidField {
            field: SCALE_OFFSET_FIELD,
            reason: "expected an object".to_string(),
        }),
        None => Ok((
            number_field(reference, "scale")?,
            reference
                .get("offset")
                .map_or(Ok(0.0), |_| number_field(reference, "offset"))?,
        )),
    }
}

/// Scale and SI offset of a linear ABCD parameterization.
fn abcd(reference: &Map<String, Value>) -> Result<(f64, f64), ReferenceError> {
    let Some(Value::Object(params)) = reference.get(ABCD_FIELD) else {
        return Err(ReferenceError::MissingField(ABCD_FIELD));
    };
    let a = number_field(params, "a")?;
    let b = number_field(params, "b")?;
    let c = number_field(params, "c")?;
    let d = number_field(params, "d")?;
    if d != 0.0 {
        return Err(ReferenceError::InvalidField {
            field: ABCD_FIELD,
            reason: "non-linear conversions (d != 0) are not supported".to_string(),
        });
    }
    if c == 0.0 {
        return Err(ReferenceError::InvalidField {
            field: ABCD_FIELD,
            reason: "c must not be zero".to_string(),
        });
    }
    Ok((b / c, a / c))
}

/// SI base symbol for a measurement ancestry such as `Length` or `L.Length`.
fn base_symbol_for_ancestry(ancestry: &str) -> Option<&'static str> {
    let root = ancestry.split('.').next()?.trim();
    let symbol = match root.to_ascii_lowercase().as_str() {
        "l" | "length" => "m",
        "t" | "time" => "s",
        "m" | "mass" => "kg",
        "k" | "temperature" | "thermodynamictemperature" | "thermodynamic_temperature" => "K",
        "a" | "angle" | "planeangle" | "plane_angle" => "rad",
        "s" | "solidangle" | "solid_angle" => "sr",
        "i" | "electriccurrent" | "electric_current" => "A",
        "n" | "amountofsubstance" | "amount_of_substance" => "mol",
        "j" | "luminousintensity" | "luminous_intensity" => "cd",
        "area" => "m2",
        "volume" => "m3",
        "velocity" => "m/s",
        "acceleration" => "m/s2",
        "density" => "kg/m3",
        "pressure" => "Pa",
        "force" => "N",
        "energy" => "J",
        "power" => "W",
        "frequency" => "Hz",
        _ => return None,
    };
    Some(symbol)
}
