use super::*;
use crate::core::errors::{PlaneResult, SimpleError};
use crate::core::tensor::{Tensor2D, Tensor4D};
use crate::core::traits::ScoringBackend;
use crate::processors::ModelInputTensor;
use ndarray::ArrayView2;
use ort::value::TensorRef;

impl OrtInfer {
    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, PlaneError>,
    ) -> Result<T, PlaneError> {
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            PlaneError::scoring_error(
                &self.model_name,
                &format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            PlaneError::scoring_error(
                &self.model_name,
                &format!(
                    "failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            PlaneError::scoring_error(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                PlaneError::scoring_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs the classifier and returns a `batch x classes` score matrix.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, PlaneError> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();
        self.run_inference_with_processor(x, |output_shape, output_data| {
            if output_shape.len() != 2 || batch_size == 0 {
                return Err(PlaneError::scoring_error(
                    &self.model_name,
                    &format!(
                        "expected a 2D output for input shape {:?}, got shape {:?}",
                        input_shape, output_shape
                    ),
                    SimpleError::new("invalid output tensor dimensions"),
                ));
            }

            let num_classes = output_data.len() / batch_size;
            if num_classes == 0 || batch_size * num_classes != output_data.len() {
                return Err(PlaneError::scoring_error(
                    &self.model_name,
                    &format!(
                        "output data size {} does not split into {} rows",
                        output_data.len(),
                        batch_size
                    ),
                    SimpleError::new("output tensor data size mismatch"),
                ));
            }

            let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
                .map_err(PlaneError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }
}

impl ScoringBackend for OrtInfer {
    fn forward(&self, input: &ModelInputTensor) -> PlaneResult<Vec<f32>> {
        let scores = self.infer_2d(input.as_array())?;
        scores
            .outer_iter()
            .next()
            .map(|row| row.to_vec())
            .ok_or_else(|| {
                PlaneError::scoring_error(
                    &self.model_name,
                    "model returned an empty batch",
                    SimpleError::new("empty output batch"),
                )
            })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }
}
