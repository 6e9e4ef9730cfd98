use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{PipelineError, Result};

/// Element type of a [`DataValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Float,
    Double,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Double => "double",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ValueType::String),
            "float" => Some(ValueType::Float),
            "double" => Some(ValueType::Double),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensionality of a [`DataValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Scalar,
    Vector,
    Matrix,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Scalar => "scalar",
            Dimension::Vector => "vector",
            Dimension::Matrix => "matrix",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "scalar" => Some(Dimension::Scalar),
            "vector" => Some(Dimension::Vector),
            "matrix" => Some(Dimension::Matrix),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(type, dimension)` pair that discriminates a [`DataValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueShape {
    pub value_type: ValueType,
    pub dimension: Dimension,
}

impl ValueShape {
    pub fn new(value_type: ValueType, dimension: Dimension) -> Self {
        Self {
            value_type,
            dimension,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value_type, self.dimension)
    }
}

/// The typed values the pipeline moves around: inputs, metadata and features
/// are all `DataValue`s. The variant fixes the `(type, dimension)` tag at
/// construction, so the tag and the payload can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    StringVector(Vec<String>),
    StringMatrix(Vec<Vec<String>>),
    Float(f32),
    FloatVector(Vec<f32>),
    FloatMatrix(Vec<Vec<f32>>),
    Double(f64),
    DoubleVector(Vec<f64>),
    DoubleMatrix(Vec<Vec<f64>>),
}

impl DataValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            DataValue::String(_) | DataValue::StringVector(_) | DataValue::StringMatrix(_) => {
                ValueType::String
            }
            DataValue::Float(_) | DataValue::FloatVector(_) | DataValue::FloatMatrix(_) => {
                ValueType::Float
            }
            DataValue::Double(_) | DataValue::DoubleVector(_) | DataValue::DoubleMatrix(_) => {
                ValueType::Double
            }
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            DataValue::String(_) | DataValue::Float(_) | DataValue::Double(_) => Dimension::Scalar,
            DataValue::StringVector(_) | DataValue::FloatVector(_) | DataValue::DoubleVector(_) => {
                Dimension::Vector
            }
            DataValue::StringMatrix(_) | DataValue::FloatMatrix(_) | DataValue::DoubleMatrix(_) => {
                Dimension::Matrix
            }
        }
    }

    pub fn shape(&self) -> ValueShape {
        ValueShape::new(self.value_type(), self.dimension())
    }

    fn mismatch(&self, requested_type: ValueType, requested_dim: Dimension) -> PipelineError {
        PipelineError::TypeMismatch {
            requested: ValueShape::new(requested_type, requested_dim),
            actual: self.shape(),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            DataValue::String(v) => Ok(v),
            other => Err(other.mismatch(ValueType::String, Dimension::Scalar)),
        }
    }

    pub fn as_string_vector(&self) -> Result<&[String]> {
        match self {
            DataValue::StringVector(v) => Ok(v),
            other => Err(other.mismatch(ValueType::String, Dimension::Vector)),
        }
    }

    pub fn as_string_matrix(&self) -> Result<&[Vec<String>]> {
        match self {
            DataValue::StringMatrix(v) => Ok(v),
            other => Err(other.mismatch(ValueType::String, Dimension::Matrix)),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self {
            DataValue::Float(v) => Ok(*v),
            other => Err(other.mismatch(ValueType::Float, Dimension::Scalar)),
        }
    }

    pub fn as_float_vector(&self) -> Result<&[f32]> {
        match self {
            DataValue::FloatVector(v) => Ok(v),
            other => Err(other.mismatch(ValueType::Float, Dimension::Vector)),
        }
    }

    pub fn as_float_matrix(&self) -> Result<&[Vec<f32>]> {
        match self {
            DataValue::FloatMatrix(v) => Ok(v),
            other => Err(other.mismatch(ValueType::Float, Dimension::Matrix)),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            DataValue::Double(v) => Ok(*v),
            other => Err(other.mismatch(ValueType::Double, Dimension::Scalar)),
        }
    }

    pub fn as_double_vector(&self) -> Result<&[f64]> {
        match self {
            DataValue::DoubleVector(v) => Ok(v),
            other => Err(other.mismatch(ValueType::Double, Dimension::Vector)),
        }
    }

    pub fn as_double_matrix(&self) -> Result<&[Vec<f64>]> {
        match self {
            DataValue::DoubleMatrix(v) => Ok(v),
            other => Err(other.mismatch(ValueType::Double, Dimension::Matrix)),
        }
    }

    /// Convert to the self-describing wire form used by the persisted
    /// pipeline document.
    pub fn to_tagged(&self) -> Result<TaggedValue> {
        let value = match self {
            DataValue::String(v) => serde_json::to_value(v)?,
            DataValue::StringVector(v) => serde_json::to_value(v)?,
            DataValue::StringMatrix(v) => serde_json::to_value(v)?,
            DataValue::Float(v) => serde_json::to_value(v)?,
            DataValue::FloatVector(v) => serde_json::to_value(v)?,
            DataValue::FloatMatrix(v) => serde_json::to_value(v)?,
            DataValue::Double(v) => serde_json::to_value(v)?,
            DataValue::DoubleVector(v) => serde_json::to_value(v)?,
            DataValue::DoubleMatrix(v) => serde_json::to_value(v)?,
        };
        Ok(TaggedValue {
            value_type: self.value_type().as_str().to_string(),
            dimension: self.dimension().as_str().to_string(),
            value,
        })
    }

    /// Rebuild a `DataValue` from its wire form. Tags outside the closed set
    /// fail with [`PipelineError::UnknownVariant`].
    pub fn from_tagged(tagged: TaggedValue) -> Result<Self> {
        let (Some(value_type), Some(dimension)) = (
            ValueType::parse(&tagged.value_type),
            Dimension::parse(&tagged.dimension),
        ) else {
            return Err(PipelineError::UnknownVariant {
                value_type: tagged.value_type,
                dimension: tagged.dimension,
            });
        };

        let value = tagged.value;
        let decoded = match (value_type, dimension) {
            (ValueType::String, Dimension::Scalar) => {
                DataValue::String(serde_json::from_value(value)?)
            }
            (ValueType::String, Dimension::Vector) => {
                DataValue::StringVector(serde_json::from_value(value)?)
            }
            (ValueType::String, Dimension::Matrix) => {
                DataValue::StringMatrix(serde_json::from_value(value)?)
            }
            (ValueType::Float, Dimension::Scalar) => {
                DataValue::Float(serde_json::from_value(value)?)
            }
            (ValueType::Float, Dimension::Vector) => {
                DataValue::FloatVector(serde_json::from_value(value)?)
            }
            (ValueType::Float, Dimension::Matrix) => {
                DataValue::FloatMatrix(serde_json::from_value(value)?)
            }
            (ValueType::Double, Dimension::Scalar) => {
                DataValue::Double(serde_json::from_value(value)?)
            }
            (ValueType::Double, Dimension::Vector) => {
                DataValue::DoubleVector(serde_json::from_value(value)?)
            }
            (ValueType::Double, Dimension::Matrix) => {
                DataValue::DoubleMatrix(serde_json::from_value(value)?)
            }
        };
        Ok(decoded)
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::String(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::String(v.to_string())
    }
}

impl From<Vec<String>> for DataValue {
    fn from(v: Vec<String>) -> Self {
        DataValue::StringVector(v)
    }
}

impl From<Vec<Vec<String>>> for DataValue {
    fn from(v: Vec<Vec<String>>) -> Self {
        DataValue::StringMatrix(v)
    }
}

impl From<f32> for DataValue {
    fn from(v: f32) -> Self {
        DataValue::Float(v)
    }
}

impl From<Vec<f32>> for DataValue {
    fn from(v: Vec<f32>) -> Self {
        DataValue::FloatVector(v)
    }
}

impl From<Vec<Vec<f32>>> for DataValue {
    fn from(v: Vec<Vec<f32>>) -> Self {
        DataValue::FloatMatrix(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Double(v)
    }
}

impl From<Vec<f64>> for DataValue {
    fn from(v: Vec<f64>) -> Self {
        DataValue::DoubleVector(v)
    }
}

impl From<Vec<Vec<f64>>> for DataValue {
    fn from(v: Vec<Vec<f64>>) -> Self {
        DataValue::DoubleMatrix(v)
    }
}

/// Wire form of a [`DataValue`]: tag before value, so decode can dispatch
/// without external schema knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub dimension: String,
    pub value: serde_json::Value,
}
