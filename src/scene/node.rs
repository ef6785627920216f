//! # Scene Node
//!
//! Nó de cena: a representação por janela do compositor. Um nó é dono do
//! seu grupo de atores (textura + sombra), do handle do buffer de pixels e
//! do objeto de damage; geometria e classificação espelham o snapshot de
//! atributos do sistema de janelas.

use std::rc::Rc;

use crate::display::{
    Atoms, DamageId, DisplayServer, MapState, PixmapId, WindowAttributes, WindowId,
};
use crate::render::{
    ActorId, FrameMargins, Stage, MAX_TILE_SZ, SHADOW_OFFSET_X, SHADOW_OFFSET_Y,
};
use crate::wm::LogicalWindow;

// =============================================================================
// CLASSIFICAÇÃO
// =============================================================================

/// Classificação do nó, resolvida na construção e re-resolvida quando a
/// propriedade de tipo muda.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Normal,
    Desktop,
    Dock,
    Menu,
    Tooltip,
    DropdownMenu,
    DragIcon,
}

// =============================================================================
// OPACIDADE
// =============================================================================

/// Converte o valor cardinal de 32 bits da propriedade de opacidade para a
/// faixa de 8 bits do render.
pub fn scale_opacity(value: u32) -> u8 {
    ((value as f64) * 255.0 / (u32::MAX as f64)).round() as u8
}

// =============================================================================
// POLÍTICA DE SOMBRA
// =============================================================================

/// Avalia a elegibilidade de sombra; primeira regra que casa decide.
pub fn shadow_eligible(
    kind: NodeKind,
    opacity: u8,
    argb32: bool,
    override_redirect: bool,
    has_frame: bool,
    shaped: bool,
) -> bool {
    // Janelas ARGB ou translúcidas já têm transparência própria;
    // sombra dobraria o efeito.
    if argb32 || opacity != 0xff {
        return false;
    }

    // Override-redirect (menus do toolkit, tooltips) recebem sombra.
    if override_redirect {
        return true;
    }

    // Moldura de decoração manda na silhueta, mesmo se o cliente é shaped.
    if has_frame {
        return true;
    }

    // Janelas não-retangulares nunca recebem sombra.
    if shaped {
        return false;
    }

    if kind == NodeKind::DragIcon || kind == NodeKind::Desktop {
        return false;
    }

    if kind == NodeKind::Menu {
        return true;
    }

    false
}

// =============================================================================
// NÓ
// =============================================================================

/// Configuração resolvida para construção de um nó.
pub struct NodeConfig {
    /// Handle nativo da janela.
    pub handle: WindowId,
    /// Janela lógica do WM, quando gerenciada.
    pub window: Option<Rc<dyn LogicalWindow>>,
    /// Snapshot de atributos no momento do registro.
    pub attrs: WindowAttributes,
}

/// Nó de cena de uma janela gerenciada.
pub struct SceneNode {
    pub handle: WindowId,
    pub window: Option<Rc<dyn LogicalWindow>>,
    pub attrs: WindowAttributes,
    pub kind: NodeKind,

    /// Grupo raiz do nó (contém sombra e textura).
    pub group: ActorId,
    /// Ator de textura com o conteúdo da janela.
    pub texture: ActorId,
    /// Sub-nó de sombra, presente sse a política avaliou verdadeiro.
    pub shadow: Option<ActorId>,

    /// Objeto de damage; ausente para janelas input-only.
    pub damage: Option<DamageId>,
    /// Buffer de pixels vinculado; ausente até o primeiro damage.
    pub back_pixmap: Option<PixmapId>,
    /// Dimensões do buffer vinculado.
    pub buffer_size: Option<crate::geometry::Size>,

    /// Opacidade configurada (0-255).
    pub opacity: u8,
    /// Formato de pixel com canal alpha.
    pub argb32: bool,
    /// Região bounding não-retangular.
    pub shaped: bool,

    /// Destruição já observada; teardown adiado até o evento corrente.
    pub destroy_pending: bool,
    /// Animação de minimize em andamento (suprime o hide do unmap).
    pub minimize_in_progress: bool,
    /// Guarda de dispose duplo.
    pub disposed: bool,
}

impl SceneNode {
    /// Constrói o nó: resolve classificação, shape e alpha, cria o objeto
    /// de damage e monta o grupo de atores (sombra primeiro, textura em cima).
    pub fn new(
        config: NodeConfig,
        display: &mut dyn DisplayServer,
        stage: &mut dyn Stage,
        atoms: &Atoms,
        shadow_src: ActorId,
    ) -> Self {
        let NodeConfig {
            handle,
            window,
            attrs,
        } = config;

        let kind = resolve_kind(handle, window.as_deref(), display, atoms);
        let shaped = display.is_shaped(handle);
        let argb32 = display.has_alpha_format(handle);

        let damage = if attrs.input_only {
            None
        } else {
            Some(display.create_damage(handle))
        };

        let opacity = 0xff;
        let has_frame = window
            .as_deref()
            .map(|w| w.frame_window().is_some())
            .unwrap_or(false);

        let group = stage.create_group();

        let shadow = if shadow_eligible(
            kind,
            opacity,
            argb32,
            attrs.override_redirect,
            has_frame,
            shaped,
        ) {
            let shadow = stage.create_frame(shadow_src, FrameMargins::uniform(MAX_TILE_SZ));
            stage.set_position(shadow, SHADOW_OFFSET_X, SHADOW_OFFSET_Y);
            stage.add_child(group, shadow);
            Some(shadow)
        } else {
            None
        };

        let texture = stage.create_texture();
        stage.add_child(group, texture);

        Self {
            handle,
            window,
            attrs,
            kind,
            group,
            texture,
            shadow,
            damage,
            back_pixmap: None,
            buffer_size: None,
            opacity,
            argb32,
            shaped,
            destroy_pending: false,
            minimize_in_progress: false,
            disposed: false,
        }
    }

    /// Re-resolve a classificação (propriedade de tipo mudou).
    pub fn refresh_kind(&mut self, display: &mut dyn DisplayServer, atoms: &Atoms) {
        self.kind = resolve_kind(self.handle, self.window.as_deref(), display, atoms);
    }

    /// O nó está visível para o render?
    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.attrs.map_state == MapState::Viewable
    }

    /// Libera o buffer de pixels. Idempotente; um buffer novo é vinculado
    /// de forma preguiçosa no próximo damage.
    pub fn detach(&mut self, display: &mut dyn DisplayServer) {
        if let Some(pixmap) = self.back_pixmap.take() {
            display.free_pixmap(pixmap);
        }
    }

    /// Libera buffer, damage e atores. Idempotente (guarda `disposed`).
    pub fn dispose(&mut self, display: &mut dyn DisplayServer, stage: &mut dyn Stage) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.detach(display);

        if let Some(damage) = self.damage.take() {
            display.push_error_trap();
            display.destroy_damage(damage);
            let _ = display.pop_error_trap();
        }

        stage.destroy_actor(self.group);

        log::debug!("nó {:?} descartado", self.handle);
    }
}

/// Resolve a classificação: tipo cacheado do WM quando gerenciada, senão
/// a lista de atoms de tipo contra a tabela fixa; Normal como padrão.
fn resolve_kind(
    handle: WindowId,
    window: Option<&dyn LogicalWindow>,
    display: &mut dyn DisplayServer,
    atoms: &Atoms,
) -> NodeKind {
    if let Some(window) = window {
        if let Some(kind) = window.cached_kind() {
            return kind;
        }
    }

    for atom in display.window_type_atoms(handle) {
        let kind = if atom == atoms.type_dnd {
            NodeKind::DragIcon
        } else if atom == atoms.type_desktop {
            NodeKind::Desktop
        } else if atom == atoms.type_dock {
            NodeKind::Dock
        } else if atom == atoms.type_menu {
            NodeKind::Menu
        } else if atom == atoms.type_tooltip {
            NodeKind::Tooltip
        } else if atom == atoms.type_dropdown_menu {
            NodeKind::DropdownMenu
        } else if atom == atoms.type_toolbar
            || atom == atoms.type_dialog
            || atom == atoms.type_normal
            || atom == atoms.type_utility
            || atom == atoms.type_splash
        {
            NodeKind::Normal
        } else {
            continue;
        };
        return kind;
    }

    NodeKind::Normal
}

// =============================================================================
// TESTES
// =============================================================================
