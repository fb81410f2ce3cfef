use crate::context::GraphicsContext;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glassroom_common::UniformLocation;
use serde::{Deserialize, Serialize};

/// A typed uniform value. The variant fixes the upload operation.
///
/// Serialized as `{"type": "float", "value": 2.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Vec3Array(Vec<Vec3>),
    IntArray(Vec<i32>),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) => "vec4",
            Self::Mat3(_) => "mat3",
            Self::Mat4(_) => "mat4",
            Self::Vec3Array(_) => "vec3_array",
            Self::IntArray(_) => "int_array",
        }
    }

    /// Issue the upload operation for this value's type.
    pub fn upload(&self, ctx: &mut dyn GraphicsContext, location: UniformLocation) {
        match self {
            Self::Float(v) => ctx.uniform_1f(location, *v),
            Self::Int(v) => ctx.uniform_1i(location, *v),
            Self::Vec2(v) => ctx.uniform_2f(location, *v),
            Self::Vec3(v) => ctx.uniform_3f(location, *v),
            Self::Vec4(v) => ctx.uniform_4f(location, *v),
            Self::Mat3(m) => ctx.uniform_matrix_3f(location, m),
            Self::Mat4(m) => ctx.uniform_matrix_4f(location, m),
            Self::Vec3Array(values) => ctx.uniform_3fv(location, values),
            Self::IntArray(values) => ctx.uniform_1iv(location, values),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};

    #[test]
    fn each_type_selects_its_upload() {
        let mut ctx = RecordingContext::new();
        let loc = UniformLocation(2);
        UniformValue::Float(2.0).upload(&mut ctx, loc);
        UniformValue::Int(1).upload(&mut ctx, loc);
        UniformValue::Mat4(Mat4::IDENTITY).upload(&mut ctx, loc);
        UniformValue::Vec3Array(vec![Vec3::X, Vec3::Y]).upload(&mut ctx, loc);
        assert_eq!(
            ctx.commands(),
            &[
                Command::Uniform1f(loc, 2.0),
                Command::Uniform1i(loc, 1),
                Command::UniformMatrix4f(loc, Mat4::IDENTITY),
                Command::Uniform3fv(loc, vec![Vec3::X, Vec3::Y]),
            ]
        );
    }

    #[test]
    fn json_form_is_type_and_value() {
        let value: UniformValue = serde_json::from_str(r#"{"type":"float","value":2.0}"#).unwrap();
        assert_eq!(value, UniformValue::Float(2.0));
        let value: UniformValue =
            serde_json::from_str(r#"{"type":"vec3","value":[1.0,0.5,0.0]}"#).unwrap();
        assert_eq!(value, UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(value.type_name(), "vec3");
    }

    #[test]
    fn conversions() {
        assert_eq!(UniformValue::from(3), UniformValue::Int(3));
        assert_eq!(UniformValue::from(Mat4::IDENTITY).type_name(), "mat4");
    }
}
