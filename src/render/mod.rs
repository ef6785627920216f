//! # Render
//!
//! Interface com a camada de renderização (árvore de atores + texturas).
//! O núcleo só descreve a cena; upload de textura, nine-slice e composição
//! final são do backend que implementa [`Stage`].

use crate::display::{PixmapId, ProtocolError, WindowId};
use crate::geometry::{Rect, Size};

// =============================================================================
// CONSTANTES DE SOMBRA
// =============================================================================

/// Raio do blur da sombra, em pixels.
pub const SHADOW_RADIUS: u32 = 8;

/// Opacidade máxima do tile de sombra gerado pelo host.
pub const SHADOW_OPACITY: f64 = 0.9;

/// Deslocamento da sombra dentro do grupo do nó.
pub const SHADOW_OFFSET_X: i32 = SHADOW_RADIUS as i32;
pub const SHADOW_OFFSET_Y: i32 = SHADOW_RADIUS as i32;

/// Lado de cada célula do tile 3x3. Deve ser <= SHADOW_RADIUS.
pub const MAX_TILE_SZ: u32 = 8;

/// Dimensões do tile compartilhado de sombra.
pub const TILE_WIDTH: u32 = 3 * MAX_TILE_SZ;
pub const TILE_HEIGHT: u32 = 3 * MAX_TILE_SZ;

// =============================================================================
// TIPOS
// =============================================================================

/// Handle de ator na cena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorId(pub u32);

/// Gravidade do ponto de âncora de um ator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gravity {
    NorthWest,
    Center,
    SouthWest,
}

/// Insets do renderer nine-slice usado pela sombra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMargins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl FrameMargins {
    /// Margens uniformes nos quatro lados.
    pub fn uniform(inset: u32) -> Self {
        Self {
            left: inset,
            top: inset,
            right: inset,
            bottom: inset,
        }
    }
}

/// Tile 3x3 de gradiente alpha pré-computado, RGBA, semeado pelo host.
/// Compartilhado (somente leitura) por todas as sombras da tela.
#[derive(Clone)]
pub struct ShadowTile {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ShadowTile {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            data,
            width,
            height,
        }
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// Superfície da camada de renderização consumida pelo núcleo.
pub trait Stage {
    /// Janela nativa da superfície de render do compositor.
    fn stage_window(&self) -> WindowId;

    /// Redimensiona a superfície de render.
    fn set_stage_size(&mut self, size: Size);

    /// Cria um grupo vazio (nó interno da árvore de atores).
    fn create_group(&mut self) -> ActorId;

    /// Cria um ator de textura ainda sem buffer.
    fn create_texture(&mut self) -> ActorId;

    /// Cria uma textura a partir de dados RGBA (tile de sombra).
    fn create_texture_from_data(&mut self, tile: &ShadowTile) -> ActorId;

    /// Cria um ator nine-slice que estica `source` com as margens dadas.
    fn create_frame(&mut self, source: ActorId, margins: FrameMargins) -> ActorId;

    fn add_to_stage(&mut self, actor: ActorId);

    fn add_child(&mut self, parent: ActorId, child: ActorId);

    fn show(&mut self, actor: ActorId);

    fn hide(&mut self, actor: ActorId);

    /// Destrói o ator e toda a sua subárvore.
    fn destroy_actor(&mut self, actor: ActorId);

    fn set_position(&mut self, actor: ActorId, x: i32, y: i32);

    fn set_size(&mut self, actor: ActorId, size: Size);

    fn set_opacity(&mut self, actor: ActorId, opacity: u8);

    fn set_scale(&mut self, actor: ActorId, sx: f64, sy: f64);

    fn set_anchor_gravity(&mut self, actor: ActorId, gravity: Gravity);

    /// Vincula o pixmap à textura do ator; retorna as dimensões do buffer.
    fn bind_pixmap(&mut self, actor: ActorId, pixmap: PixmapId) -> Result<Size, ProtocolError>;

    /// Reenvia uma sub-região do buffer para a textura.
    fn update_area(&mut self, actor: ActorId, area: Rect);

    /// Vínculo zero-copy acelerado ativo para o ator? Nesse caso um rebind
    /// completo é mais barato que replay de sub-retângulos.
    fn direct_binding(&self, actor: ActorId) -> bool;
}
