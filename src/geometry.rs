//! # Geometria
//!
//! Tipos geométricos básicos (ponto, tamanho, retângulo) e a região de
//! damage usada pelo sincronizador de buffers.

// =============================================================================
// PONTO / TAMANHO
// =============================================================================

/// Ponto no desktop (pode ser negativo para janelas fora da tela).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Tamanho em pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// =============================================================================
// RETÂNGULO
// =============================================================================

/// Retângulo em coordenadas de tela.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Retângulo na origem com o tamanho dado.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Borda direita (exclusiva).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Borda inferior (exclusiva).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Retorna se há sobreposição com outro retângulo.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Bounding box dos dois retângulos.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

// =============================================================================
// REGIÃO DE DAMAGE
// =============================================================================

/// Limite de rects antes de agrupar tudo em um bounding box.
const MAX_REGION_RECTS: usize = 16;

/// Conjunto de retângulos danificados desde o último repair.
#[derive(Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Cria região vazia.
    pub fn new() -> Self {
        Self {
            rects: Vec::with_capacity(16),
        }
    }

    /// Adiciona região danificada.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }

        // Tentar merge com rect existente se houver overlap
        for existing in &mut self.rects {
            if existing.intersects(&rect) {
                *existing = existing.union(&rect);
                return;
            }
        }

        self.rects.push(rect);

        if self.rects.len() > MAX_REGION_RECTS {
            self.collapse();
        }
    }

    /// Agrupa todos os rects em um bounding box.
    fn collapse(&mut self) {
        if self.rects.len() <= 1 {
            return;
        }

        let mut bounds = self.rects[0];
        for rect in &self.rects[1..] {
            bounds = bounds.union(rect);
        }

        self.rects.clear();
        self.rects.push(bounds);
    }

    /// Retorna os retângulos acumulados.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Retorna e limpa os retângulos (take).
    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_union_is_bounding_box() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 5, 10, 10);
        assert_eq!(a.union(&b), Rect::new(0, 0, 30, 15));
    }

    #[test]
    fn rect_intersects_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
    }

    #[test]
    fn region_merges_overlapping_rects() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(5, 5, 10, 10));
        assert_eq!(region.rects(), &[Rect::new(0, 0, 15, 15)]);
    }

    #[test]
    fn region_ignores_empty_rects() {
        let mut region = Region::new();
        region.add(Rect::new(3, 3, 0, 5));
        assert!(region.is_empty());
    }

    #[test]
    fn region_collapses_when_crossing_limit() {
        let mut region = Region::new();
        for i in 0..17 {
            region.add(Rect::new(i * 100, 0, 10, 10));
        }
        // O 17º rect cruza o limite e agrupa tudo em um bounding box.
        assert_eq!(region.rects().len(), 1);

        // Depois do colapso a região volta a acumular normalmente.
        region.add(Rect::new(10_000, 0, 10, 10));
        assert_eq!(region.rects().len(), 2);
    }

    #[test]
    fn region_take_leaves_empty() {
        let mut region = Region::new();
        region.add(Rect::new(1, 2, 3, 4));
        let rects = region.take();
        assert_eq!(rects.len(), 1);
        assert!(region.is_empty());
    }
}
