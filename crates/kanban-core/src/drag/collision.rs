//! Drop target selection when several candidates are under the pointer

use serde::{Deserialize, Serialize};

use super::DragSubject;
use crate::domain::Board;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned client rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            Point::new(self.left, self.top),
            Point::new(right, self.top),
            Point::new(self.left, bottom),
            Point::new(right, bottom),
        ]
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// How the closest drop target is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollisionStrategy {
    /// Distance from the pointer to the candidate's center
    #[default]
    ClosestCenter,
    /// Mean distance from the pointer to the candidate's four corners
    ClosestCorners,
}

impl CollisionStrategy {
    fn score(&self, pointer: &Point, rect: &Rect) -> f64 {
        match self {
            Self::ClosestCenter => pointer.distance(&rect.center()),
            Self::ClosestCorners => {
                rect.corners().iter().map(|c| pointer.distance(c)).sum::<f64>() / 4.0
            }
        }
    }
}

/// A droppable element: namespaced DOM id plus its client rect
#[derive(Debug, Clone, PartialEq)]
pub struct DropCandidate {
    pub dom_id: String,
    pub rect: Rect,
}

impl DropCandidate {
    pub fn new(dom_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            dom_id: dom_id.into(),
            rect,
        }
    }
}

/// Sort candidates into board order: list order, a list before its cards,
/// then card order. Ids not on the board go last.
pub fn order_candidates(board: &Board, candidates: &mut [DropCandidate]) {
    let rank = |candidate: &DropCandidate| match DragSubject::parse(&candidate.dom_id) {
        Some(DragSubject::List(id)) => board.list_index(&id).map(|l| (l, 0)),
        Some(DragSubject::Card(id)) => board.locate_card(&id).map(|(l, c)| (l, c + 1)),
        None => None,
    };
    candidates.sort_by_key(|candidate| rank(candidate).unwrap_or((usize::MAX, usize::MAX)));
}

/// Pick the closest candidate. Ties go to the earliest candidate, so callers
/// pass them in board order (see `order_candidates`).
pub fn resolve_collision<'a>(
    pointer: &Point,
    candidates: &'a [DropCandidate],
    strategy: CollisionStrategy,
) -> Option<&'a DropCandidate> {
    let mut best: Option<(&DropCandidate, f64)> = None;
    for candidate in candidates {
        let score = strategy.score(pointer, &candidate.rect);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, List};

    #[test]
    fn test_closest_center() {
        let candidates = vec![
            DropCandidate::new("card:a", Rect::new(0.0, 0.0, 100.0, 40.0)),
            DropCandidate::new("card:b", Rect::new(0.0, 50.0, 100.0, 40.0)),
        ];
        let hit = resolve_collision(&Point::new(50.0, 60.0), &candidates, CollisionStrategy::ClosestCenter);
        assert_eq!(hit.map(|c| c.dom_id.as_str()), Some("card:b"));
    }

    #[test]
    fn test_closest_corners_prefers_small_target() {
        // Pointer sits inside a tall column and just next to a small card.
        // The column's center is nearer, its corners are not.
        let candidates = vec![
            DropCandidate::new("list:l1", Rect::new(0.0, 0.0, 200.0, 600.0)),
            DropCandidate::new("card:c1", Rect::new(10.0, 330.0, 180.0, 40.0)),
        ];
        let pointer = Point::new(100.0, 310.0);

        let center = resolve_collision(&pointer, &candidates, CollisionStrategy::ClosestCenter);
        let corners = resolve_collision(&pointer, &candidates, CollisionStrategy::ClosestCorners);

        assert_eq!(center.map(|c| c.dom_id.as_str()), Some("list:l1"));
        assert_eq!(corners.map(|c| c.dom_id.as_str()), Some("card:c1"));
    }

    #[test]
    fn test_ties_break_by_board_order() {
        let mut board = Board::new("b1", "Board1");
        let mut l1 = List::new("l1", "b1", "L1", 0);
        l1.cards.push(Card::new("c1", "l1", "C1", 0));
        l1.cards.push(Card::new("c2", "l1", "C2", 1));
        board.lists.push(l1);

        // Identical rects: only order decides
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut candidates = vec![
            DropCandidate::new("card:c2", rect),
            DropCandidate::new("card:zz", rect),
            DropCandidate::new("card:c1", rect),
            DropCandidate::new("list:l1", rect),
        ];
        order_candidates(&board, &mut candidates);

        let ids: Vec<_> = candidates.iter().map(|c| c.dom_id.as_str()).collect();
        assert_eq!(ids, vec!["list:l1", "card:c1", "card:c2", "card:zz"]);
        let hit = resolve_collision(&Point::new(5.0, 5.0), &candidates, CollisionStrategy::ClosestCenter);
        assert_eq!(hit.map(|c| c.dom_id.as_str()), Some("list:l1"));
    }

    #[test]
    fn test_no_candidates() {
        assert!(resolve_collision(&Point::default(), &[], CollisionStrategy::ClosestCorners).is_none());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(rect.contains(&Point::new(12.0, 15.0)));
        assert!(!rect.contains(&Point::new(9.0, 12.0)));
    }
}
