//! Device-resident, gradient-tracking tensors and their host conversion

use serde::{Deserialize, Serialize};

use super::{Array, DType, Element};
use crate::{Error, Result};

/// Where a tensor's storage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    /// Host memory
    Cpu,
    /// Accelerator memory, by device ordinal
    Accelerator(usize),
}

/// Conversion into a plain host-memory [`Array`].
///
/// Contract for implementors:
/// - gradient tracking is stripped (only values are copied),
/// - data is copied off any compute device into host memory,
/// - shape and dtype are preserved,
/// - the source is left untouched.
///
/// Tensor types from other frameworks can implement this to be saved or
/// logged through a [`crate::Session`].
pub trait ToHostArray {
    /// Copy the values into host memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be copied off the device.
    fn to_host_array(&self) -> Result<Array>;
}

impl ToHostArray for Array {
    fn to_host_array(&self) -> Result<Array> {
        Ok(self.clone())
    }
}

/// Tensor with a device tag and optional gradient tracking.
///
/// Storage is an [`Array`]; moving between devices copies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    storage: Array,
    device: Device,
    requires_grad: bool,
    grad: Option<Array>,
}

impl Tensor {
    /// Wrap host storage in a CPU tensor without gradient tracking.
    #[must_use]
    pub const fn new(storage: Array) -> Self {
        Self {
            storage,
            device: Device::Cpu,
            requires_grad: false,
            grad: None,
        }
    }

    /// Create a one-dimensional CPU tensor.
    #[must_use]
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self::new(Array::from_vec(values))
    }

    /// Create a CPU tensor with the given shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the element count does not match.
    pub fn from_shape_vec<T: Element>(shape: impl Into<Vec<usize>>, values: Vec<T>) -> Result<Self> {
        Array::from_shape_vec(shape, values).map(Self::new)
    }

    /// Enable or disable gradient tracking.
    #[must_use]
    pub fn with_requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        if !requires_grad {
            self.grad = None;
        }
        self
    }

    /// Device the storage lives on.
    #[must_use]
    pub const fn device(&self) -> Device {
        self.device
    }

    /// Whether gradients are tracked.
    #[must_use]
    pub const fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Accumulated gradient, if any.
    #[must_use]
    pub const fn grad(&self) -> Option<&Array> {
        self.grad.as_ref()
    }

    /// Shape of the values.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.storage.shape()
    }

    /// Element type of the values.
    #[must_use]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Attach a gradient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] if gradients are not tracked, or
    /// [`Error::ShapeMismatch`] if the gradient's shape differs.
    pub fn set_grad(&mut self, grad: Array) -> Result<()> {
        if !self.requires_grad {
            return Err(Error::Other(
                "cannot attach a gradient to a tensor that does not require grad".to_string(),
            ));
        }
        if grad.shape() != self.storage.shape() {
            return Err(Error::ShapeMismatch {
                shape: self.storage.shape().to_vec(),
                expected: self.storage.len(),
                actual: grad.len(),
            });
        }
        self.grad = Some(grad);
        Ok(())
    }

    /// Copy of this tensor on `device`.
    #[must_use]
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            device,
            ..self.clone()
        }
    }

    /// Copy of this tensor in host memory.
    #[must_use]
    pub fn cpu(&self) -> Self {
        self.to_device(Device::Cpu)
    }

    /// Copy of this tensor with gradient tracking removed.
    #[must_use]
    pub fn detach(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            device: self.device,
            requires_grad: false,
            grad: None,
        }
    }
}

impl ToHostArray for Tensor {
    fn to_host_array(&self) -> Result<Array> {
        Ok(self.detach().cpu().storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked_accelerator_tensor() -> Tensor {
        let mut tensor = Tensor::from_shape_vec([2, 2], vec![1.0f32, -2.0, 3.5, 0.25])
            .unwrap()
            .with_requires_grad(true)
            .to_device(Device::Accelerator(0));
        tensor
            .set_grad(Array::from_shape_vec([2, 2], vec![0.1f32; 4]).unwrap())
            .unwrap();
        tensor
    }

    #[test]
    fn test_to_host_array_preserves_values_shape_dtype() {
        let tensor = tracked_accelerator_tensor();
        let host = tensor.to_host_array().unwrap();

        assert_eq!(host.shape(), &[2, 2]);
        assert_eq!(host.dtype(), DType::F32);
        assert_eq!(host.to_vec::<f32>().unwrap(), vec![1.0, -2.0, 3.5, 0.25]);
    }

    #[test]
    fn test_to_host_array_leaves_tensor_untouched() {
        let tensor = tracked_accelerator_tensor();
        let _ = tensor.to_host_array().unwrap();

        assert_eq!(tensor.device(), Device::Accelerator(0));
        assert!(tensor.requires_grad());
        assert!(tensor.grad().is_some());
    }

    #[test]
    fn test_detach_drops_grad() {
        let detached = tracked_accelerator_tensor().detach();
        assert!(!detached.requires_grad());
        assert!(detached.grad().is_none());
        assert_eq!(detached.device(), Device::Accelerator(0));
    }

    #[test]
    fn test_set_grad_requires_tracking() {
        let mut tensor = Tensor::from_vec(vec![1.0f64]);
        assert!(tensor.set_grad(Array::from_vec(vec![0.0f64])).is_err());
    }

    #[test]
    fn test_set_grad_shape_checked() {
        let mut tensor = Tensor::from_vec(vec![1.0f64, 2.0]).with_requires_grad(true);
        let err = tensor.set_grad(Array::from_vec(vec![0.0f64])).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
