//! # Window Registry
//!
//! Registro de janelas por tela: dono dos nós de cena, da ordem de
//! empilhamento (frente para trás, fonte única da ordem de pintura), do
//! subconjunto de docks e da referência de foco.

use std::collections::HashMap;

use crate::display::WindowId;

use super::node::{NodeKind, SceneNode};

/// Registro de nós de uma tela.
#[derive(Default)]
pub struct Registry {
    /// Ordem de empilhamento, frente (topo) para trás (fundo).
    order: Vec<WindowId>,
    /// Nós por handle nativo.
    nodes: HashMap<WindowId, SceneNode>,
    /// Subconjunto de nós classificados como Dock.
    docks: Vec<WindowId>,
    /// Janela com foco de teclado (referência fraca; limpa no unmap).
    pub focus: Option<WindowId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere o nó no topo da pilha, antes de ele ficar visível, para que
    /// o map subsequente sempre o encontre.
    pub fn insert(&mut self, node: SceneNode) {
        let handle = node.handle;

        if node.kind == NodeKind::Dock {
            self.docks.push(handle);
        }

        self.order.insert(0, handle);
        self.nodes.insert(handle, node);
    }

    /// Lookup O(1) por handle.
    #[inline]
    pub fn get(&self, handle: WindowId) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: WindowId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&handle)
    }

    #[inline]
    pub fn contains(&self, handle: WindowId) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// Remove o nó da ordem, do mapa e do subconjunto de docks, devolvendo
    /// a posse dele. Segunda chamada é no-op (retorna `None`).
    pub fn remove(&mut self, handle: WindowId) -> Option<SceneNode> {
        let node = self.nodes.remove(&handle)?;
        self.order.retain(|w| *w != handle);
        self.docks.retain(|w| *w != handle);
        Some(node)
    }

    /// Reordena o nó. `above == None` é a sentinela de fundo: o nó vai para
    /// o final da sequência. Senão, se o vizinho logo atrás já não é
    /// `above`, o nó é removido e reinserido imediatamente à frente do nó
    /// com handle `above`; se `above` não está registrado, a operação é
    /// descartada (inconsistência recuperável, não um erro).
    pub fn restack(&mut self, handle: WindowId, above: Option<WindowId>) {
        let Some(pos) = self.order.iter().position(|w| *w == handle) else {
            return;
        };

        let Some(above) = above else {
            self.order.remove(pos);
            self.order.push(handle);
            return;
        };

        // Vizinho logo atrás na sequência (em direção ao fundo).
        let previous_above = self.order.get(pos + 1).copied();
        if previous_above == Some(above) {
            return;
        }

        let Some(target) = self.order.iter().position(|w| *w == above) else {
            return;
        };

        self.order.remove(pos);
        let target = if pos < target { target - 1 } else { target };
        self.order.insert(target, handle);
    }

    /// Handle no topo da pilha.
    #[inline]
    pub fn front(&self) -> Option<WindowId> {
        self.order.first().copied()
    }

    /// Ordem de empilhamento, frente para trás.
    #[inline]
    pub fn order(&self) -> &[WindowId] {
        &self.order
    }

    #[inline]
    pub fn docks(&self) -> &[WindowId] {
        &self.docks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Re-sincroniza o subconjunto de docks depois de uma reclassificação:
    /// o nó está na lista sse a classificação atual é Dock.
    pub fn sync_dock(&mut self, handle: WindowId) {
        let Some(node) = self.nodes.get(&handle) else {
            return;
        };

        let is_dock = node.kind == NodeKind::Dock;
        let listed = self.docks.contains(&handle);

        if is_dock && !listed {
            self.docks.push(handle);
        } else if !is_dock && listed {
            self.docks.retain(|w| *w != handle);
        }
    }

    /// Limpa a referência de foco se ela aponta para a janela dada.
    pub fn clear_focus_if(&mut self, window: WindowId) {
        if self.focus == Some(window) {
            self.focus = None;
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================
