//! # Display
//!
//! Interface com o sistema de janelas (protocolo X-like). O núcleo consome
//! o servidor através do trait [`DisplayServer`]: consultas de atributos,
//! primitivas de damage, redirecionamento composite e error traps com
//! escopo. A implementação real (cliente de protocolo) vive no host.

use thiserror::Error;

use crate::geometry::{Region, Size};

// =============================================================================
// HANDLES
// =============================================================================

/// Handle nativo de janela.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Handle de pixmap nomeado (buffer de pixels compartilhado).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixmapId(pub u32);

/// Handle do objeto de damage de uma janela.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DamageId(pub u32);

/// Atom internado no servidor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

// =============================================================================
// ATRIBUTOS
// =============================================================================

bitflags::bitflags! {
    /// Máscara de eventos selecionados em uma janela.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EventMask: u32 {
        const PROPERTY_CHANGE = 1 << 0;
        const EXPOSURE        = 1 << 1;
    }
}

/// Estado de visibilidade reportado pelo servidor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapState {
    #[default]
    Unmapped,
    Viewable,
}

/// Snapshot dos atributos nativos de uma janela.
#[derive(Clone, Debug, Default)]
pub struct WindowAttributes {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
    pub override_redirect: bool,
    /// Janela só de input (sem pixels; nunca recebe damage).
    pub input_only: bool,
    pub map_state: MapState,
    pub event_mask: EventMask,
}

impl WindowAttributes {
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

// =============================================================================
// EVENTOS
// =============================================================================

/// Posição alvo de um CirculateNotify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Top,
    Bottom,
}

/// Dados de um ConfigureNotify.
#[derive(Clone, Debug)]
pub struct ConfigureEvent {
    pub window: WindowId,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
    pub override_redirect: bool,
    /// Irmão logo abaixo na pilha; `None` = fundo da pilha.
    pub above: Option<WindowId>,
}

/// Eventos do sistema de janelas consumidos pelo dispatcher.
#[derive(Clone, Debug)]
pub enum Event {
    Create { window: WindowId, parent: WindowId },
    Destroy { window: WindowId },
    Map { window: WindowId },
    Unmap { window: WindowId, from_configure: bool },
    Reparent { window: WindowId, parent: WindowId },
    Configure(ConfigureEvent),
    Circulate { window: WindowId, place: Placement },
    Property { window: WindowId, atom: Atom },
    Damage { window: WindowId },
}

// =============================================================================
// ERROS
// =============================================================================

/// Erro transiente de protocolo (janela correndo contra a própria destruição).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("janela {0:?} não existe mais")]
    WindowGone(WindowId),
    #[error("outro compositor já redirecionou a tela")]
    AlreadyRedirected,
    #[error("operação de protocolo falhou: {0}")]
    Failed(&'static str),
}

// =============================================================================
// TABELA DE ATOMS
// =============================================================================

/// Atoms internados uma vez na criação do compositor.
#[derive(Clone, Copy, Debug)]
pub struct Atoms {
    pub net_wm_window_opacity: Atom,
    pub net_wm_window_type: Atom,
    pub type_dnd: Atom,
    pub type_desktop: Atom,
    pub type_dock: Atom,
    pub type_toolbar: Atom,
    pub type_menu: Atom,
    pub type_dialog: Atom,
    pub type_normal: Atom,
    pub type_utility: Atom,
    pub type_splash: Atom,
    pub type_tooltip: Atom,
    pub type_dropdown_menu: Atom,
}

impl Atoms {
    /// Interna todos os atoms que o dispatcher compara.
    pub fn intern(display: &mut dyn DisplayServer) -> Self {
        Self {
            net_wm_window_opacity: display.intern_atom("_NET_WM_WINDOW_OPACITY"),
            net_wm_window_type: display.intern_atom("_NET_WM_WINDOW_TYPE"),
            type_dnd: display.intern_atom("_NET_WM_WINDOW_TYPE_DND"),
            type_desktop: display.intern_atom("_NET_WM_WINDOW_TYPE_DESKTOP"),
            type_dock: display.intern_atom("_NET_WM_WINDOW_TYPE_DOCK"),
            type_toolbar: display.intern_atom("_NET_WM_WINDOW_TYPE_TOOLBAR"),
            type_menu: display.intern_atom("_NET_WM_WINDOW_TYPE_MENU"),
            type_dialog: display.intern_atom("_NET_WM_WINDOW_TYPE_DIALOG"),
            type_normal: display.intern_atom("_NET_WM_WINDOW_TYPE_NORMAL"),
            type_utility: display.intern_atom("_NET_WM_WINDOW_TYPE_UTILITY"),
            type_splash: display.intern_atom("_NET_WM_WINDOW_TYPE_SPLASH"),
            type_tooltip: display.intern_atom("_NET_WM_WINDOW_TYPE_TOOLTIP"),
            type_dropdown_menu: display.intern_atom("_NET_WM_WINDOW_TYPE_DROPDOWN_MENU"),
        }
    }
}

// =============================================================================
// SERVIDOR DE DISPLAY
// =============================================================================

/// Superfície de protocolo que o núcleo consome do sistema de janelas.
///
/// Todos os métodos são não-bloqueantes; falhas transientes (janela sumiu
/// no meio de uma consulta) voltam como [`ProtocolError`] ou são coletadas
/// pelo error trap com escopo (`push_error_trap`/`pop_error_trap`).
pub trait DisplayServer {
    /// Interna um atom pelo nome.
    fn intern_atom(&mut self, name: &str) -> Atom;

    /// Raiz da tela lógica gerenciada.
    fn root_window(&self) -> WindowId;

    /// Dimensões atuais da tela.
    fn screen_size(&self) -> Size;

    /// Janela com foco de teclado no momento.
    fn focus_window(&self) -> Option<WindowId>;

    /// Snapshot de atributos; falha se a janela já foi destruída.
    fn window_attributes(&mut self, window: WindowId)
        -> Result<WindowAttributes, ProtocolError>;

    /// Garante PROPERTY_CHANGE na máscara de eventos da janela.
    fn select_property_events(&mut self, window: WindowId);

    /// Pai da janela na árvore do servidor.
    fn query_parent(&mut self, window: WindowId) -> Option<WindowId>;

    /// Lista de atoms de tipo (_NET_WM_WINDOW_TYPE) da janela.
    fn window_type_atoms(&mut self, window: WindowId) -> Vec<Atom>;

    /// Região bounding não-retangular? (extensão shape)
    fn is_shaped(&mut self, window: WindowId) -> bool;

    /// Formato de pixel com máscara de alpha direta?
    fn has_alpha_format(&mut self, window: WindowId) -> bool;

    /// Lê uma propriedade cardinal de 32 bits; `None` se ausente/malformada.
    fn cardinal_property(&mut self, window: WindowId, atom: Atom) -> Option<u32>;

    /// Cria o objeto de damage da janela.
    fn create_damage(&mut self, window: WindowId) -> DamageId;

    fn destroy_damage(&mut self, damage: DamageId);

    /// Zera o damage acumulado sem coletar retângulos.
    fn clear_damage(&mut self, damage: DamageId);

    /// Subtrai e retorna o damage acumulado como lista de retângulos.
    fn fetch_damage(&mut self, damage: DamageId) -> Region;

    /// Nomeia um pixmap com o conteúdo atual da janela.
    fn name_window_pixmap(&mut self, window: WindowId) -> Result<PixmapId, ProtocolError>;

    fn free_pixmap(&mut self, pixmap: PixmapId);

    /// Redireciona as subjanelas da raiz para composição manual.
    /// Falha se outro compositor já é dono da tela.
    fn redirect_subwindows(&mut self, root: WindowId) -> Result<(), ProtocolError>;

    /// Janela overlay off-screen da extensão composite.
    fn overlay_window(&mut self, root: WindowId) -> WindowId;

    /// Torna o overlay visível e transparente a input.
    fn show_overlay(&mut self, overlay: WindowId);

    fn reparent_window(&mut self, window: WindowId, parent: WindowId);

    /// Reivindica a seleção de compositing manager da tela.
    fn claim_cm_selection(&mut self, root: WindowId);

    /// Remove da fila (se existir) um DestroyNotify pendente para a janela.
    ///
    /// Usado pelo dispatcher para coalescer damage+destroy: o evento é o
    /// próximo da fila, nunca reordenado.
    fn take_queued_destroy(&mut self, window: WindowId) -> bool;

    /// Abre um escopo de captura de erros de protocolo.
    fn push_error_trap(&mut self);

    /// Fecha o escopo; retorna `true` se algum erro foi capturado.
    fn pop_error_trap(&mut self) -> bool;
}
