//! # WM
//!
//! Interface com a camada lógica do gerenciador de janelas. Um nó de cena
//! guarda apenas uma referência não-dona para a janela lógica; quem é dono
//! dela é o host.

use crate::display::WindowId;
use crate::scene::NodeKind;

/// Janela lógica gerenciada pelo WM (decoração, tipo cacheado, foco).
pub trait LogicalWindow {
    /// Janela cliente.
    fn client_window(&self) -> WindowId;

    /// Janela da moldura de decoração, se a janela é decorada.
    fn frame_window(&self) -> Option<WindowId>;

    /// Classificação cacheada pelo WM; `None` quando o WM não tem o atom
    /// de tipo e o compositor deve resolver sozinho.
    fn cached_kind(&self) -> Option<NodeKind>;
}

/// Handle efetivo para efeitos e lookups: a moldura quando existe,
/// senão a própria janela cliente.
pub fn effective_handle(window: &dyn LogicalWindow) -> WindowId {
    window.frame_window().unwrap_or_else(|| window.client_window())
}
