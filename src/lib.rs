//! # Vagalume
//!
//! Núcleo de composição de janelas: mapeia janelas do sistema em um grafo
//! de cena (textura + sombra por janela) e mantém as texturas em dia com o
//! fluxo de damage, reenviando só as sub-regiões que mudaram.
//!
//! ## Arquitetura
//!
//! - **display**: interface com o sistema de janelas ([`display::DisplayServer`])
//! - **render**: interface com a camada de render ([`render::Stage`])
//! - **wm**: interface com a camada lógica do WM ([`wm::LogicalWindow`])
//! - **scene**: nó por janela + registro ordenado por tela
//! - **effects**: animações de destroy e minimize dirigidas por tick
//! - **server**: o [`Compositor`] em si (bootstrap + dispatch + repair)
//!
//! O núcleo não fala protocolo nem sobe textura: consome os três traits de
//! borda e descreve a cena. O host injeta as implementações reais.

pub mod display;
pub mod effects;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod server;
pub mod wm;

pub use display::{Atoms, DisplayServer, Event, WindowId};
pub use render::{ShadowTile, Stage};
pub use scene::{NodeKind, Registry, SceneNode};
pub use server::{Compositor, ScreenSession, SessionError};
pub use wm::LogicalWindow;
