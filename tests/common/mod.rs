//! Dublês de teste para as três bordas do núcleo: display, render e WM.

use std::collections::{HashMap, HashSet};

use vagalume::display::{
    Atom, DamageId, DisplayServer, PixmapId, ProtocolError, WindowAttributes, WindowId,
};
use vagalume::geometry::{Rect, Region, Size};
use vagalume::render::{ActorId, FrameMargins, Gravity, ShadowTile, Stage};
use vagalume::scene::NodeKind;
use vagalume::wm::LogicalWindow;

pub const ROOT: WindowId = WindowId(1);
pub const STAGE_WINDOW: WindowId = WindowId(2);
pub const OVERLAY: WindowId = WindowId(3);

// =============================================================================
// DISPLAY
// =============================================================================

/// Servidor de display em memória; os campos públicos são o estado que os
/// testes semeiam e inspecionam.
pub struct MockDisplay {
    pub screen: Size,
    pub focus: Option<WindowId>,
    pub attrs: HashMap<WindowId, WindowAttributes>,
    pub parents: HashMap<WindowId, WindowId>,
    pub type_atoms: HashMap<WindowId, Vec<Atom>>,
    pub shaped: HashSet<WindowId>,
    pub argb: HashSet<WindowId>,
    pub cardinals: HashMap<(WindowId, Atom), u32>,
    /// Janelas com um DestroyNotify já enfileirado.
    pub queued_destroys: HashSet<WindowId>,
    /// Janelas cujo name_window_pixmap deve falhar.
    pub pixmapless: HashSet<WindowId>,
    /// Rects de damage pendentes, por objeto de damage.
    pub pending_damage: HashMap<DamageId, Vec<Rect>>,
    pub fail_redirect: bool,

    pub selected_property: HashSet<WindowId>,
    pub damages: HashMap<WindowId, DamageId>,
    pub destroyed_damages: Vec<DamageId>,
    pub cleared_damages: Vec<DamageId>,
    pub freed_pixmaps: Vec<PixmapId>,
    pub cm_claimed: bool,
    pub reparents: Vec<(WindowId, WindowId)>,
    pub overlay_shown: bool,

    atoms: HashMap<String, Atom>,
    next_atom: u32,
    next_damage: u32,
    next_pixmap: u32,
    trap_depth: u32,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self {
            screen: Size::new(1280, 800),
            focus: None,
            attrs: HashMap::new(),
            parents: HashMap::new(),
            type_atoms: HashMap::new(),
            shaped: HashSet::new(),
            argb: HashSet::new(),
            cardinals: HashMap::new(),
            queued_destroys: HashSet::new(),
            pixmapless: HashSet::new(),
            pending_damage: HashMap::new(),
            fail_redirect: false,
            selected_property: HashSet::new(),
            damages: HashMap::new(),
            destroyed_damages: Vec::new(),
            cleared_damages: Vec::new(),
            freed_pixmaps: Vec::new(),
            cm_claimed: false,
            reparents: Vec::new(),
            overlay_shown: false,
            atoms: HashMap::new(),
            next_atom: 100,
            next_damage: 1,
            next_pixmap: 1,
            trap_depth: 0,
        }
    }
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Semeia os atributos de uma janela.
    pub fn seed_window(&mut self, window: WindowId, attrs: WindowAttributes) {
        self.attrs.insert(window, attrs);
    }

    /// Atom já internado pelo nome (panica se não foi).
    pub fn atom(&self, name: &str) -> Atom {
        self.atoms[name]
    }
}

impl DisplayServer for MockDisplay {
    fn intern_atom(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.atoms.get(name) {
            return *atom;
        }
        let atom = Atom(self.next_atom);
        self.next_atom += 1;
        self.atoms.insert(name.to_owned(), atom);
        atom
    }

    fn root_window(&self) -> WindowId {
        ROOT
    }

    fn screen_size(&self) -> Size {
        self.screen
    }

    fn focus_window(&self) -> Option<WindowId> {
        self.focus
    }

    fn window_attributes(&mut self, window: WindowId) -> Result<WindowAttributes, ProtocolError> {
        self.attrs
            .get(&window)
            .cloned()
            .ok_or(ProtocolError::WindowGone(window))
    }

    fn select_property_events(&mut self, window: WindowId) {
        self.selected_property.insert(window);
    }

    fn query_parent(&mut self, window: WindowId) -> Option<WindowId> {
        self.parents.get(&window).copied()
    }

    fn window_type_atoms(&mut self, window: WindowId) -> Vec<Atom> {
        self.type_atoms.get(&window).cloned().unwrap_or_default()
    }

    fn is_shaped(&mut self, window: WindowId) -> bool {
        self.shaped.contains(&window)
    }

    fn has_alpha_format(&mut self, window: WindowId) -> bool {
        self.argb.contains(&window)
    }

    fn cardinal_property(&mut self, window: WindowId, atom: Atom) -> Option<u32> {
        self.cardinals.get(&(window, atom)).copied()
    }

    fn create_damage(&mut self, window: WindowId) -> DamageId {
        let damage = DamageId(self.next_damage);
        self.next_damage += 1;
        self.damages.insert(window, damage);
        damage
    }

    fn destroy_damage(&mut self, damage: DamageId) {
        self.destroyed_damages.push(damage);
    }

    fn clear_damage(&mut self, damage: DamageId) {
        self.cleared_damages.push(damage);
        self.pending_damage.remove(&damage);
    }

    fn fetch_damage(&mut self, damage: DamageId) -> Region {
        let mut region = Region::new();
        for rect in self.pending_damage.remove(&damage).unwrap_or_default() {
            region.add(rect);
        }
        region
    }

    fn name_window_pixmap(&mut self, window: WindowId) -> Result<PixmapId, ProtocolError> {
        if self.pixmapless.contains(&window) {
            return Err(ProtocolError::WindowGone(window));
        }
        let pixmap = PixmapId(self.next_pixmap);
        self.next_pixmap += 1;
        Ok(pixmap)
    }

    fn free_pixmap(&mut self, pixmap: PixmapId) {
        self.freed_pixmaps.push(pixmap);
    }

    fn redirect_subwindows(&mut self, _root: WindowId) -> Result<(), ProtocolError> {
        if self.fail_redirect {
            Err(ProtocolError::AlreadyRedirected)
        } else {
            Ok(())
        }
    }

    fn overlay_window(&mut self, _root: WindowId) -> WindowId {
        OVERLAY
    }

    fn show_overlay(&mut self, _overlay: WindowId) {
        self.overlay_shown = true;
    }

    fn reparent_window(&mut self, window: WindowId, parent: WindowId) {
        self.reparents.push((window, parent));
    }

    fn claim_cm_selection(&mut self, _root: WindowId) {
        self.cm_claimed = true;
    }

    fn take_queued_destroy(&mut self, window: WindowId) -> bool {
        self.queued_destroys.remove(&window)
    }

    fn push_error_trap(&mut self) {
        self.trap_depth += 1;
    }

    fn pop_error_trap(&mut self) -> bool {
        assert!(self.trap_depth > 0, "pop de trap sem push");
        self.trap_depth -= 1;
        false
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// Camada de render em memória com o estado por ator gravado para inspeção.
pub struct MockStage {
    pub stage_size: Size,
    /// Tamanho reportado ao vincular um pixmap.
    pub bind_size: Size,
    /// Vínculo zero-copy ativo para todas as texturas.
    pub direct: bool,

    pub groups: HashSet<ActorId>,
    pub textures: HashSet<ActorId>,
    pub frames: HashMap<ActorId, (ActorId, FrameMargins)>,
    pub stage_children: Vec<ActorId>,
    pub children: HashMap<ActorId, Vec<ActorId>>,
    pub visible: HashMap<ActorId, bool>,
    pub positions: HashMap<ActorId, (i32, i32)>,
    pub sizes: HashMap<ActorId, Size>,
    pub opacities: HashMap<ActorId, u8>,
    pub scales: HashMap<ActorId, (f64, f64)>,
    pub anchors: HashMap<ActorId, Gravity>,
    pub bound: HashMap<ActorId, PixmapId>,
    pub updates: Vec<(ActorId, Rect)>,
    pub destroyed: HashSet<ActorId>,
    pub tile_uploads: u32,

    next_actor: u32,
}

impl Default for MockStage {
    fn default() -> Self {
        Self {
            stage_size: Size::default(),
            bind_size: Size::new(640, 480),
            direct: false,
            groups: HashSet::new(),
            textures: HashSet::new(),
            frames: HashMap::new(),
            stage_children: Vec::new(),
            children: HashMap::new(),
            visible: HashMap::new(),
            positions: HashMap::new(),
            sizes: HashMap::new(),
            opacities: HashMap::new(),
            scales: HashMap::new(),
            anchors: HashMap::new(),
            bound: HashMap::new(),
            updates: Vec::new(),
            destroyed: HashSet::new(),
            tile_uploads: 0,
            next_actor: 1,
        }
    }
}

impl MockStage {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> ActorId {
        let actor = ActorId(self.next_actor);
        self.next_actor += 1;
        actor
    }

    pub fn is_visible(&self, actor: ActorId) -> bool {
        self.visible.get(&actor).copied().unwrap_or(false)
    }

    /// Rects reenviados para um ator de textura.
    pub fn updates_for(&self, actor: ActorId) -> Vec<Rect> {
        self.updates
            .iter()
            .filter(|(a, _)| *a == actor)
            .map(|(_, r)| *r)
            .collect()
    }
}

impl Stage for MockStage {
    fn stage_window(&self) -> WindowId {
        STAGE_WINDOW
    }

    fn set_stage_size(&mut self, size: Size) {
        self.stage_size = size;
    }

    fn create_group(&mut self) -> ActorId {
        let actor = self.alloc();
        self.groups.insert(actor);
        actor
    }

    fn create_texture(&mut self) -> ActorId {
        let actor = self.alloc();
        self.textures.insert(actor);
        actor
    }

    fn create_texture_from_data(&mut self, _tile: &ShadowTile) -> ActorId {
        self.tile_uploads += 1;
        let actor = self.alloc();
        self.textures.insert(actor);
        actor
    }

    fn create_frame(&mut self, source: ActorId, margins: FrameMargins) -> ActorId {
        let actor = self.alloc();
        self.frames.insert(actor, (source, margins));
        actor
    }

    fn add_to_stage(&mut self, actor: ActorId) {
        self.stage_children.push(actor);
    }

    fn add_child(&mut self, parent: ActorId, child: ActorId) {
        self.children.entry(parent).or_default().push(child);
    }

    fn show(&mut self, actor: ActorId) {
        self.visible.insert(actor, true);
    }

    fn hide(&mut self, actor: ActorId) {
        self.visible.insert(actor, false);
    }

    fn destroy_actor(&mut self, actor: ActorId) {
        self.destroyed.insert(actor);
        for child in self.children.remove(&actor).unwrap_or_default() {
            self.destroy_actor(child);
        }
    }

    fn set_position(&mut self, actor: ActorId, x: i32, y: i32) {
        self.positions.insert(actor, (x, y));
    }

    fn set_size(&mut self, actor: ActorId, size: Size) {
        self.sizes.insert(actor, size);
    }

    fn set_opacity(&mut self, actor: ActorId, opacity: u8) {
        self.opacities.insert(actor, opacity);
    }

    fn set_scale(&mut self, actor: ActorId, sx: f64, sy: f64) {
        self.scales.insert(actor, (sx, sy));
    }

    fn set_anchor_gravity(&mut self, actor: ActorId, gravity: Gravity) {
        self.anchors.insert(actor, gravity);
    }

    fn bind_pixmap(&mut self, actor: ActorId, pixmap: PixmapId) -> Result<Size, ProtocolError> {
        self.bound.insert(actor, pixmap);
        Ok(self.bind_size)
    }

    fn update_area(&mut self, actor: ActorId, area: Rect) {
        self.updates.push((actor, area));
    }

    fn direct_binding(&self, _actor: ActorId) -> bool {
        self.direct
    }
}

// =============================================================================
// WM
// =============================================================================

/// Janela lógica fixa para testes.
pub struct MockWindow {
    pub client: WindowId,
    pub frame: Option<WindowId>,
    pub kind: Option<NodeKind>,
}

impl MockWindow {
    pub fn undecorated(client: WindowId) -> Self {
        Self {
            client,
            frame: None,
            kind: None,
        }
    }

    pub fn framed(client: WindowId, frame: WindowId) -> Self {
        Self {
            client,
            frame: Some(frame),
            kind: Some(NodeKind::Normal),
        }
    }
}

impl LogicalWindow for MockWindow {
    fn client_window(&self) -> WindowId {
        self.client
    }

    fn frame_window(&self) -> Option<WindowId> {
        self.frame
    }

    fn cached_kind(&self) -> Option<NodeKind> {
        self.kind
    }
}
