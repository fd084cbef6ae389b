use crate::MotionErrors;
use nalgebra::Vector3;

/// A batch argument: one value shared by every body, or one value per body.
#[derive(Debug, Clone, PartialEq)]
pub enum PerBody<T> {
    Shared(T),
    Each(Vec<T>),
}

impl<T: Clone> PerBody<T> {
    /// Expands to exactly `n` values.
    pub fn expand(self, n: usize) -> Result<Vec<T>, MotionErrors> {
        match self {
            PerBody::Shared(value) => Ok(vec![value; n]),
            PerBody::Each(values) if values.len() == n => Ok(values),
            PerBody::Each(values) => {
                Err(MotionErrors::LengthMismatch { expected: n, got: values.len() })
            }
        }
    }
}

impl From<f64> for PerBody<f64> {
    fn from(value: f64) -> Self {
        PerBody::Shared(value)
    }
}

impl From<Vec<f64>> for PerBody<f64> {
    fn from(values: Vec<f64>) -> Self {
        PerBody::Each(values)
    }
}

impl From<&[f64]> for PerBody<f64> {
    fn from(values: &[f64]) -> Self {
        PerBody::Each(values.to_vec())
    }
}

impl From<Vector3<f64>> for PerBody<Vector3<f64>> {
    fn from(value: Vector3<f64>) -> Self {
        PerBody::Shared(value)
    }
}

impl From<Vec<Vector3<f64>>> for PerBody<Vector3<f64>> {
    fn from(values: Vec<Vector3<f64>>) -> Self {
        PerBody::Each(values)
    }
}

impl From<&[Vector3<f64>]> for PerBody<Vector3<f64>> {
    fn from(values: &[Vector3<f64>]) -> Self {
        PerBody::Each(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_is_broadcast() {
        let values = PerBody::from(2.5_f64)
            .expand(3)
            .unwrap();
        assert_eq!(values, vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn test_each_must_match_length() {
        let values = PerBody::from(vec![1.0, 2.0])
            .expand(2)
            .unwrap();
        assert_eq!(values, vec![1.0, 2.0]);

        let result = PerBody::from([1.0_f64, 2.0, 3.0].as_slice()).expand(2);
        assert_eq!(result, Err(MotionErrors::LengthMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_vector_conversions() {
        let shared = PerBody::from(Vector3::<f64>::x());
        assert_eq!(shared, PerBody::Shared(Vector3::x()));

        let axes: Vec<Vector3<f64>> = vec![Vector3::x(), Vector3::y()];
        assert_eq!(PerBody::from(axes.as_slice()), PerBody::Each(axes));
    }
}
