//! # Event Dispatch
//!
//! Tradução dos eventos do sistema de janelas em mutações de registro e
//! nó, mais o sincronizador de buffers (`repair_win`). Dispatch é síncrono
//! e por evento, sem reordenação; a única espiada à frente é a coalescência
//! damage+destroy.

use std::rc::Rc;

use crate::display::{
    Atom, Atoms, ConfigureEvent, DisplayServer, Event, EventMask, MapState, Placement,
    WindowAttributes, WindowId,
};
use crate::geometry::Rect;
use crate::render::Stage;
use crate::scene::{scale_opacity, NodeConfig, SceneNode};
use crate::wm::LogicalWindow;

use super::ScreenSession;

// =============================================================================
// DISPATCH
// =============================================================================

/// Processa um evento do sistema de janelas.
pub(crate) fn process_event(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    atoms: &Atoms,
    event: &Event,
    window: Option<Rc<dyn LogicalWindow>>,
) {
    match event {
        Event::Create { window: w, parent } => {
            process_create(session, display, stage, atoms, *w, *parent, window)
        }
        Event::Reparent { window: w, parent } => {
            process_reparent(session, display, stage, atoms, *w, *parent, window)
        }
        Event::Destroy { window } => destroy_win(session, display, stage, *window),
        Event::Map { window } => map_win(session, stage, *window),
        Event::Unmap {
            window,
            from_configure,
        } => process_unmap(session, display, stage, *window, *from_configure),
        Event::Configure(configure) => process_configure(session, display, stage, configure),
        Event::Circulate { window, place } => process_circulate(session, *window, *place),
        Event::Property { window, atom } => {
            process_property(session, display, stage, atoms, *window, *atom)
        }
        Event::Damage { window } => process_damage(session, display, stage, *window),
    }
}

// =============================================================================
// REGISTRO DE JANELAS
// =============================================================================

/// Registra uma janela na tela. No-op para a janela overlay do próprio
/// compositor; aborta sem criar nó se a consulta de atributos falhar.
pub(crate) fn register(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    atoms: &Atoms,
    handle: WindowId,
    window: Option<Rc<dyn LogicalWindow>>,
    snapshot: Option<WindowAttributes>,
) {
    if handle == session.overlay {
        return;
    }

    // Re-registro (reparent de volta para a raiz): descarta o nó antigo
    // antes de criar o novo, mantendo mapa e ordem consistentes.
    if let Some(mut old) = session.registry.remove(handle) {
        old.dispose(display, stage);
    }

    let attrs = match snapshot {
        Some(attrs) => attrs,
        None => match display.window_attributes(handle) {
            Ok(attrs) => attrs,
            Err(err) => {
                log::debug!("registro de {:?} abortado: {}", handle, err);
                return;
            }
        },
    };

    // Janela não gerenciada pelo WM pode não ter PropertyChange selecionado.
    if !attrs.event_mask.contains(EventMask::PROPERTY_CHANGE) {
        display.select_property_events(handle);
    }

    let node = SceneNode::new(
        NodeConfig {
            handle,
            window,
            attrs,
        },
        display,
        stage,
        atoms,
        session.shadow_src,
    );

    let viewable = node.is_mapped();

    stage.set_position(node.group, node.attrs.x, node.attrs.y);
    stage.add_to_stage(node.group);
    stage.hide(node.group);

    log::debug!(
        "janela {:?} adicionada ({:?}, {}x{})",
        handle,
        node.kind,
        node.attrs.width,
        node.attrs.height
    );

    session.registry.insert(node);

    if viewable {
        map_win(session, stage, handle);
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

fn process_create(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    atoms: &Atoms,
    handle: WindowId,
    parent: WindowId,
    window: Option<Rc<dyn LogicalWindow>>,
) {
    if parent != session.root {
        return;
    }

    if !session.registry.contains(handle) {
        register(session, display, stage, atoms, handle, window, None);
    }
}

fn process_reparent(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    atoms: &Atoms,
    handle: WindowId,
    parent: WindowId,
    window: Option<Rc<dyn LogicalWindow>>,
) {
    if parent == session.root {
        log::trace!("reparent de {:?} para a raiz: registrando", handle);
        register(session, display, stage, atoms, handle, window, None);
    } else {
        log::trace!("reparent de {:?} para fora da raiz: destruindo", handle);
        destroy_win(session, display, stage, handle);
    }
}

/// Remove e descarta o nó, se rastreado. Idempotente.
pub(crate) fn destroy_win(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    handle: WindowId,
) {
    if let Some(mut node) = session.registry.remove(handle) {
        node.dispose(display, stage);
        log::debug!("janela {:?} destruída", handle);
    }
}

fn map_win(session: &mut ScreenSession, stage: &mut dyn Stage, handle: WindowId) {
    let Some(node) = session.registry.get_mut(handle) else {
        return;
    };

    node.attrs.map_state = MapState::Viewable;
    node.minimize_in_progress = false;
    stage.show(node.group);
}

fn process_unmap(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    handle: WindowId,
    from_configure: bool,
) {
    // Unmap sintetizado pelo resize do pai; a janela continua viável.
    if from_configure {
        return;
    }

    let Some(node) = session.registry.get_mut(handle) else {
        return;
    };

    if node.destroy_pending {
        return;
    }

    // Se o DestroyNotify já está na fila, derrubar de vez em vez de
    // processar o unmap.
    if display.take_queued_destroy(handle) {
        node.destroy_pending = true;
        destroy_win(session, display, stage, handle);
        return;
    }

    let client = node.window.as_ref().map(|w| w.client_window());

    node.attrs.map_state = MapState::Unmapped;
    node.detach(display);

    // Durante um minimize quem controla a visibilidade é a animação.
    if !node.minimize_in_progress {
        stage.hide(node.group);
    }

    if let Some(client) = client {
        session.registry.clear_focus_if(client);
    }
}

fn process_configure(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    event: &ConfigureEvent,
) {
    if session.registry.contains(event.window) {
        session.registry.restack(event.window, event.above);
        resize_win(session, display, stage, event);
    } else if event.window == session.root {
        stage.set_stage_size(display.screen_size());
        log::debug!("tela redimensionada para {}x{}", event.width, event.height);
    }
}

fn resize_win(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    event: &ConfigureEvent,
) {
    let Some(node) = session.registry.get_mut(event.window) else {
        return;
    };

    node.attrs.x = event.x;
    node.attrs.y = event.y;
    stage.set_position(node.group, event.x, event.y);

    // O rebind do pixmap nomeado é quem redimensiona os atores; aqui só
    // invalidamos o buffer antigo.
    if node.attrs.width != event.width || node.attrs.height != event.height {
        node.detach(display);
    }

    node.attrs.width = event.width;
    node.attrs.height = event.height;
    node.attrs.border_width = event.border_width;
    node.attrs.override_redirect = event.override_redirect;
}

fn process_circulate(session: &mut ScreenSession, handle: WindowId, place: Placement) {
    if !session.registry.contains(handle) {
        return;
    }

    let above = match place {
        Placement::Top => session.registry.front(),
        Placement::Bottom => None,
    };
    session.registry.restack(handle, above);
}

fn process_property(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    atoms: &Atoms,
    window: WindowId,
    atom: Atom,
) {
    if atom == atoms.net_wm_window_opacity {
        // Aplicações setam a propriedade no toplevel delas; se o handle não
        // é rastreado, o nó alvo é o do pai (a moldura de decoração).
        let target = if session.registry.contains(window) {
            Some(window)
        } else {
            display
                .query_parent(window)
                .filter(|parent| session.registry.contains(*parent))
        };

        let Some(target) = target else {
            return;
        };

        // Propriedade ausente ou malformada: no-op.
        let Some(value) = display.cardinal_property(window, atom) else {
            return;
        };

        let opacity = scale_opacity(value);
        if let Some(node) = session.registry.get_mut(target) {
            node.opacity = opacity;
            stage.set_opacity(node.group, opacity);
        }
    } else if atom == atoms.net_wm_window_type {
        if let Some(node) = session.registry.get_mut(window) {
            node.refresh_kind(display, atoms);
            session.registry.sync_dock(window);
        }
    }
}

fn process_damage(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    handle: WindowId,
) {
    let Some(node) = session.registry.get_mut(handle) else {
        return;
    };

    if node.destroy_pending {
        return;
    }

    // Janela prestes a morrer gera um último damage; reparar agora
    // vincularia um buffer imediatamente inválido. Se o DestroyNotify já
    // está na fila, derrubar direto.
    if display.take_queued_destroy(handle) {
        node.destroy_pending = true;
        destroy_win(session, display, stage, handle);
        return;
    }

    repair_win(session, display, stage, handle);
}

// =============================================================================
// SINCRONIZADOR DE BUFFER
// =============================================================================

/// (Re)vincula o buffer compartilhado da janela à textura e reenvia só as
/// sub-regiões danificadas. Com vínculo zero-copy o rebind completo já
/// ressincronizou tudo, então a textura inteira é marcada de uma vez.
pub(crate) fn repair_win(
    session: &mut ScreenSession,
    display: &mut dyn DisplayServer,
    stage: &mut dyn Stage,
    handle: WindowId,
) {
    // Damage da raiz ou da própria superfície de render nunca interessa.
    if handle == session.root || handle == stage.stage_window() {
        return;
    }

    let Some(node) = session.registry.get_mut(handle) else {
        return;
    };

    display.push_error_trap();

    if node.back_pixmap.is_none() {
        let pixmap = match display.name_window_pixmap(handle) {
            Ok(pixmap) => pixmap,
            Err(err) => {
                log::debug!("sem pixmap nomeado para {:?}: {}", handle, err);
                let _ = display.pop_error_trap();
                return;
            }
        };

        let size = match stage.bind_pixmap(node.texture, pixmap) {
            Ok(size) => size,
            Err(err) => {
                log::debug!("vínculo do pixmap de {:?} falhou: {}", handle, err);
                display.free_pixmap(pixmap);
                let _ = display.pop_error_trap();
                return;
            }
        };

        node.back_pixmap = Some(pixmap);
        node.buffer_size = Some(size);

        // Primeiro vínculo dita as dimensões reais do conteúdo.
        stage.set_size(node.texture, size);
        if let Some(shadow) = node.shadow {
            stage.set_size(shadow, size);
        }
    }

    if let Some(damage) = node.damage {
        if stage.direct_binding(node.texture) {
            display.clear_damage(damage);
            let full = Rect::from_size(node.buffer_size.unwrap_or_default());
            stage.update_area(node.texture, full);
        } else {
            let region = display.fetch_damage(damage);
            for rect in region.rects() {
                stage.update_area(node.texture, *rect);
            }
        }
    }

    let _ = display.pop_error_trap();
}
