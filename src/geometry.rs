//! Pure layout arithmetic for the bubble: clamping, drag, resize and
//! edge-snapping. Nothing in here touches the UI or storage.

/// Minimum bubble size enforced while resizing.
pub const MIN_WIDTH: f32 = 200.0;
pub const MIN_HEIGHT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos {
    pub left: f32,
    pub top: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Edge-keeping rules: minimum margin from the sides, a reserved band at the
/// top and the distance at which a released drag snaps to an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRules {
    pub safe_margin: f32,
    pub safe_top: f32,
    pub snap_distance: f32,
}

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Clamp a stored (or default) position so the whole bubble stays inside the
/// safe region of the viewport.
pub fn compute_initial_position(
    left: f32,
    top: f32,
    size: Size,
    viewport: Viewport,
    rules: SnapRules,
) -> Pos {
    Pos {
        left: clamp(
            left,
            rules.safe_margin,
            viewport.width - size.width - rules.safe_margin,
        ),
        top: clamp(
            top,
            rules.safe_top,
            viewport.height - size.height - rules.safe_margin,
        ),
    }
}

/// New position while dragging: pointer minus the press offset, clamped into
/// the safe region. Called on every pointer move of an active drag.
pub fn compute_drag_position(
    pointer: Point,
    drag_offset: Point,
    size: Size,
    viewport: Viewport,
    rules: SnapRules,
) -> Pos {
    compute_initial_position(
        pointer.x - drag_offset.x,
        pointer.y - drag_offset.y,
        size,
        viewport,
        rules,
    )
}

/// Pin the bubble to an edge when the gap to that edge is below the snap
/// distance. Each axis is handled independently; called once on drag release.
pub fn snap_to_edges(pos: Pos, size: Size, viewport: Viewport, rules: SnapRules) -> Pos {
    let mut left = pos.left;
    let mut top = pos.top;

    if pos.left < rules.snap_distance {
        left = rules.safe_margin;
    }
    if viewport.width - (pos.left + size.width) < rules.snap_distance {
        left = viewport.width - size.width - rules.safe_margin;
    }
    if pos.top - rules.safe_top < rules.snap_distance {
        top = rules.safe_top;
    }
    if viewport.height - (pos.top + size.height) < rules.snap_distance {
        top = viewport.height - size.height - rules.safe_margin;
    }

    Pos { left, top }
}

/// New size while resizing: start size plus pointer delta, floored at the
/// minimum size. There is no upper bound.
pub fn compute_resized_size(pointer: Point, start_pointer: Point, start: Size) -> Size {
    Size {
        width: (start.width + pointer.x - start_pointer.x).max(MIN_WIDTH),
        height: (start.height + pointer.y - start_pointer.y).max(MIN_HEIGHT),
    }
}
