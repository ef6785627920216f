//! # Effects
//!
//! Transições temporizadas de destroy e minimize. Cada animação é uma
//! máquina de estados explícita {alvo, decorrido, duração, curva} avançada
//! por tick; ao completar, executa a transição final (descartar o nó, ou
//! esconder e restaurar o estado estável).

use std::f64::consts::FRAC_PI_2;

use crate::display::{DisplayServer, WindowId};
use crate::render::{ActorId, Gravity, Stage};
use crate::scene::{Registry, SceneNode};

// =============================================================================
// CONSTANTES
// =============================================================================

/// Duração da animação de destroy.
pub const DESTROY_TIMEOUT_MS: u32 = 300;

/// Duração da animação de minimize.
pub const MINIMIZE_TIMEOUT_MS: u32 = 600;

// =============================================================================
// CURVA
// =============================================================================

/// Curva de interpolação do template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// Seno crescente: rápido no início, suave no fim.
    SineInc,
}

impl Curve {
    /// Alpha da curva para um progresso em [0, 1].
    pub fn alpha(&self, progress: f64) -> f64 {
        match self {
            Curve::SineInc => (progress.clamp(0.0, 1.0) * FRAC_PI_2).sin(),
        }
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// Template de timing compartilhado por todas as animações de um mesmo
/// tipo na tela; somente leitura depois de construído.
#[derive(Clone, Copy, Debug)]
pub struct EffectTemplate {
    pub duration_ms: u32,
    pub curve: Curve,
}

impl EffectTemplate {
    pub fn new(duration_ms: u32, curve: Curve) -> Self {
        Self { duration_ms, curve }
    }
}

// =============================================================================
// EXECUÇÃO
// =============================================================================

/// Tipo da transição.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    Destroy,
    Minimize,
}

/// Alvo da animação.
enum EffectTarget {
    /// Destroy: o nó já saiu do registro; a animação é a dona dele.
    Owned(Box<SceneNode>),
    /// Minimize: o nó continua no registro, referenciado por handle.
    Tracked(WindowId),
}

/// Uma animação em andamento sobre um nó.
pub struct EffectRun {
    template: EffectTemplate,
    elapsed_ms: u32,
    target: EffectTarget,
    /// Grupo de atores sendo animado.
    group: ActorId,
    /// Opacidade estável de partida do fade.
    steady_opacity: u8,
}

impl EffectRun {
    /// Animação de destroy; assume a posse do nó já removido do registro.
    pub fn destroy(template: EffectTemplate, node: SceneNode) -> Self {
        let group = node.group;
        let steady_opacity = node.opacity;
        Self {
            template,
            elapsed_ms: 0,
            target: EffectTarget::Owned(Box::new(node)),
            group,
            steady_opacity,
        }
    }

    /// Animação de minimize sobre um nó que permanece registrado.
    pub fn minimize(template: EffectTemplate, handle: WindowId, group: ActorId, steady_opacity: u8) -> Self {
        Self {
            template,
            elapsed_ms: 0,
            target: EffectTarget::Tracked(handle),
            group,
            steady_opacity,
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self.target {
            EffectTarget::Owned(_) => EffectKind::Destroy,
            EffectTarget::Tracked(_) => EffectKind::Minimize,
        }
    }

    /// Avança a animação e aplica fade + scale concorrentes no grupo.
    /// Retorna `true` quando o tempo da transição se esgotou.
    pub fn advance(&mut self, dt_ms: u32, stage: &mut dyn Stage) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        let progress = if self.template.duration_ms == 0 {
            1.0
        } else {
            (self.elapsed_ms as f64 / self.template.duration_ms as f64).min(1.0)
        };
        let factor = 1.0 - self.template.curve.alpha(progress);

        stage.set_opacity(self.group, (self.steady_opacity as f64 * factor).round() as u8);
        stage.set_scale(self.group, factor, factor);

        self.elapsed_ms >= self.template.duration_ms
    }

    /// Transição de conclusão: destrói o nó de vez, ou esconde e restaura
    /// opacidade/escala/âncora para o estado estável.
    pub fn finish(
        self,
        registry: &mut Registry,
        display: &mut dyn DisplayServer,
        stage: &mut dyn Stage,
    ) {
        match self.target {
            EffectTarget::Owned(mut node) => {
                node.dispose(display, stage);
            }
            EffectTarget::Tracked(handle) => {
                let Some(node) = registry.get_mut(handle) else {
                    // Nó saiu do registro durante a animação (destruído);
                    // nada a restaurar.
                    return;
                };

                stage.hide(node.group);
                stage.set_opacity(node.group, node.opacity);
                stage.set_scale(node.group, 1.0, 1.0);
                stage.set_anchor_gravity(node.group, Gravity::NorthWest);
                node.minimize_in_progress = false;

                log::debug!("minimize de {:?} concluído", handle);
            }
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================
