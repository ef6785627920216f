//! # Scene Module
//!
//! Cena do compositor: um nó por janela gerenciada e o registro ordenado
//! por tela.
//!
//! ## Componentes
//!
//! - **SceneNode**: nó por janela (geometria, classificação, buffer, sombra)
//! - **Registry**: ordem de empilhamento + índice por handle + docks

pub mod node;
pub mod registry;

pub use node::{scale_opacity, shadow_eligible, NodeConfig, NodeKind, SceneNode};
pub use registry::Registry;
