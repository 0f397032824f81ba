use anyhow::Result;
use async_trait::async_trait;
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayViewD, Axis, IxDyn};
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::application::ports::DetectorPort;
use crate::config::Config;
use crate::domain::detection::RawDetection;
use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy)]
pub struct YoloParams {
    pub input_size: u32,
    pub conf_threshold: f32,
    pub max_detections: usize,
}

impl From<&Config> for YoloParams {
    fn from(cfg: &Config) -> Self {
        Self {
            input_size: cfg.input_size,
            conf_threshold: cfg.conf_threshold,
            max_detections: cfg.max_detections,
        }
    }
}

/// Envoltorio del modelo YOLO exportado a ONNX. El motor no sabe nada del
/// vocabulario de símbolos: emite ids numéricos y la capa de aplicación los
/// resuelve contra la tabla.
pub struct OnnxYoloEngine {
    session: Session,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(path: &Path, params: YoloParams) -> Result<Self> {
        let builder = Session::builder()?.with_intra_threads(4)?;

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session, params })
    }

    /// Una pasada de inferencia: la imagen se reescala al tamaño de entrada
    /// del modelo y las cajas se reproyectan a píxeles de la imagen original.
    pub fn infer(&mut self, rgb: &RgbImage) -> Result<Vec<RawDetection>> {
        let imgsz = self.params.input_size as usize;
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Nearest);

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let input_tensor = Value::from_array((input_shape, input.into_raw_vec()))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        // Salida YOLO: [1, 4 + n_clases, n_candidatos] en formato cxcywh.
        let dims: Vec<usize> = shape_out.into_iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        let num_candidates = view.shape()[1];
        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;

        let mut detections = Vec::new();

        for i in 0..num_candidates {
            let scores = view.slice(s![4.., i]);
            let Some((class_id, &max_score)) = scores
                .indexed_iter()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
            else {
                continue;
            };

            if max_score > self.params.conf_threshold {
                let cx = view[[0, i]];
                let cy = view[[1, i]];
                let w = view[[2, i]];
                let h = view[[3, i]];

                detections.push(RawDetection {
                    x1: (cx - w / 2.0) * sx,
                    y1: (cy - h / 2.0) * sy,
                    x2: (cx + w / 2.0) * sx,
                    y2: (cy + h / 2.0) * sy,
                    score: max_score,
                    class_id,
                });
            }
        }

        detections.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));
        detections.truncate(self.params.max_detections);
        Ok(detections)
    }
}

/// Adaptador que expone el motor como `DetectorPort`. La sesión de `ort`
/// necesita `&mut` para ejecutarse, así que las peticiones concurrentes se
/// serializan en el mutex.
pub struct OnnxDetector {
    engine: Mutex<OnnxYoloEngine>,
}

impl OnnxDetector {
    pub fn load(path: &Path, params: YoloParams) -> Result<Self> {
        let engine = OnnxYoloEngine::load(path, params)?;
        Ok(Self {
            engine: Mutex::new(engine),
        })
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn infer(&self, image: &RgbImage) -> DomainResult<Vec<RawDetection>> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| DomainError::OperationFailed("lock del motor envenenado".into()))?;
        engine
            .infer(image)
            .map_err(|e| DomainError::OperationFailed(format!("fallo de inferencia: {e}")))
    }
}
