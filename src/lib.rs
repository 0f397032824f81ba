//! asmusic: servicio HTTP de reconocimiento óptico de notación musical.
//!
//! Dos endpoints sin estado comparten un modelo YOLO cargado una sola vez
//! al arrancar: `POST /detect` localiza símbolos en una imagen de partitura
//! y `POST /convert` transforma una secuencia de etiquetas de símbolos en
//! un fichero MusicXML.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
