//! # Servidor do Compositor
//!
//! Ponto de entrada do núcleo: posse da conexão com o display e com a
//! camada de render, bootstrap da tela (redirecionamento, overlay, tile de
//! sombra, templates de animação) e as operações que o gerenciador de
//! janelas chama diretamente (destroy e minimize animados, tick).

use std::rc::Rc;

use thiserror::Error;

use crate::display::{Atoms, DisplayServer, Event, WindowAttributes, WindowId};
use crate::effects::{Curve, EffectRun, EffectTemplate, DESTROY_TIMEOUT_MS, MINIMIZE_TIMEOUT_MS};
use crate::render::{ActorId, Gravity, ShadowTile, Stage};
use crate::scene::Registry;
use crate::wm::{effective_handle, LogicalWindow};

mod dispatch;

// =============================================================================
// ERROS
// =============================================================================

/// Falha fatal do bootstrap da tela.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("outro gerenciador de composição já é dono da tela")]
    ScreenOwned,
}

// =============================================================================
// SESSÃO DE TELA
// =============================================================================

/// Estado de uma tela gerenciada: registro de nós, handles da raiz e do
/// overlay, tile de sombra e animações em andamento.
pub struct ScreenSession {
    pub root: WindowId,
    pub overlay: WindowId,
    pub registry: Registry,
    /// Textura compartilhada do tile de sombra.
    pub shadow_src: ActorId,
    pub destroy_template: EffectTemplate,
    pub minimize_template: EffectTemplate,
    effects: Vec<EffectRun>,
}

// =============================================================================
// COMPOSITOR
// =============================================================================

/// O compositor: cena e sincronização de buffers para uma tela.
pub struct Compositor<D: DisplayServer, S: Stage> {
    display: D,
    stage: S,
    atoms: Atoms,
    session: Option<ScreenSession>,
}

impl<D: DisplayServer, S: Stage> Compositor<D, S> {
    /// Cria o compositor e interna a tabela de atoms. A tela só passa a
    /// ser gerenciada em [`Compositor::manage_screen`].
    pub fn new(mut display: D, stage: S) -> Self {
        let atoms = Atoms::intern(&mut display);
        Self {
            display,
            stage,
            atoms,
            session: None,
        }
    }

    /// Assume a composição da tela: redireciona as subjanelas da raiz,
    /// monta o overlay com a superfície de render dentro e semeia o tile
    /// de sombra e os templates de animação. Segunda chamada é no-op.
    pub fn manage_screen(&mut self, shadow_tile: &ShadowTile) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Ok(());
        }

        let root = self.display.root_window();

        self.display.push_error_trap();
        let redirected = self.display.redirect_subwindows(root);
        let trapped = self.display.pop_error_trap();
        if redirected.is_err() || trapped {
            log::warn!("tela já redirecionada por outro compositor");
            return Err(SessionError::ScreenOwned);
        }

        let overlay = self.display.overlay_window(root);
        self.display.claim_cm_selection(root);

        self.stage.set_stage_size(self.display.screen_size());
        self.display
            .reparent_window(self.stage.stage_window(), overlay);

        let shadow_src = self.stage.create_texture_from_data(shadow_tile);

        self.display.show_overlay(overlay);

        let mut registry = Registry::new();
        registry.focus = self.display.focus_window();

        self.session = Some(ScreenSession {
            root,
            overlay,
            registry,
            shadow_src,
            destroy_template: EffectTemplate::new(DESTROY_TIMEOUT_MS, Curve::SineInc),
            minimize_template: EffectTemplate::new(MINIMIZE_TIMEOUT_MS, Curve::SineInc),
            effects: Vec::new(),
        });

        log::info!("tela {:?} sob composição (overlay {:?})", root, overlay);
        Ok(())
    }

    /// Registra uma janela já existente (varredura inicial do WM). O host
    /// pode passar o snapshot de atributos que já tem; sem ele, o registro
    /// consulta o display. Erros de corrida com a destruição da janela são
    /// absorvidos pelo trap.
    pub fn add_window(
        &mut self,
        window: Option<Rc<dyn LogicalWindow>>,
        handle: WindowId,
        attrs: Option<WindowAttributes>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.display.push_error_trap();
        dispatch::register(
            session,
            &mut self.display,
            &mut self.stage,
            &self.atoms,
            handle,
            window,
            attrs,
        );
        let _ = self.display.pop_error_trap();
    }

    /// Processa um evento do sistema de janelas. O evento inteiro roda
    /// dentro de um error trap: a janela pode morrer entre o evento e
    /// qualquer consulta que o handler faça.
    pub fn process_event(&mut self, event: &Event, window: Option<Rc<dyn LogicalWindow>>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.display.push_error_trap();
        dispatch::process_event(
            session,
            &mut self.display,
            &mut self.stage,
            &self.atoms,
            event,
            window,
        );
        let _ = self.display.pop_error_trap();
    }

    /// Inicia a animação de destroy: o nó sai do registro na hora (eventos
    /// residuais do handle viram no-ops) e a animação assume a posse dele.
    pub fn destroy_window(&mut self, window: &dyn LogicalWindow) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let handle = effective_handle(window);
        let Some(node) = session.registry.remove(handle) else {
            return;
        };

        self.stage.set_anchor_gravity(node.group, Gravity::Center);
        session
            .effects
            .push(EffectRun::destroy(session.destroy_template, node));

        log::debug!("destroy animado de {:?} iniciado", handle);
    }

    /// Inicia a animação de minimize: o nó permanece registrado, com a
    /// flag de minimize armada para suprimir o hide do unmap que vem a
    /// seguir.
    pub fn minimize_window(&mut self, window: &dyn LogicalWindow) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let handle = effective_handle(window);
        let Some(node) = session.registry.get_mut(handle) else {
            return;
        };

        node.minimize_in_progress = true;
        self.stage
            .set_anchor_gravity(node.group, Gravity::SouthWest);
        session.effects.push(EffectRun::minimize(
            session.minimize_template,
            handle,
            node.group,
            node.opacity,
        ));

        log::debug!("minimize animado de {:?} iniciado", handle);
    }

    /// Avança o relógio das animações; as que completaram executam a
    /// transição final e saem da lista.
    pub fn tick(&mut self, dt_ms: u32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let runs = std::mem::take(&mut session.effects);
        for mut run in runs {
            if run.advance(dt_ms, &mut self.stage) {
                run.finish(&mut session.registry, &mut self.display, &mut self.stage);
            } else {
                session.effects.push(run);
            }
        }
    }

    /// Há animações em andamento?
    pub fn has_pending_effects(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| !s.effects.is_empty())
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Acessores
    // -------------------------------------------------------------------------

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    pub fn session(&self) -> Option<&ScreenSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ScreenSession> {
        self.session.as_mut()
    }
}
