#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }
}

/// Axis-aligned rectangle. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect { left, top, right, bottom }
    }

    pub const fn from_size(width: i32, height: i32) -> Self { Rect::new(0, 0, width, height) }

    pub fn is_empty(&self) -> bool { self.left >= self.right || self.top >= self.bottom }

    pub fn top_left(&self) -> Point { Point::new(self.left, self.top) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_emptiness() {
        let rect = Rect::new(10, 10, 100, 200);
        assert_eq!(Point::new(10, 10), rect.top_left());
        assert!(!rect.is_empty());
        assert!(Rect::default().is_empty());
        assert!(Rect::new(5, 5, 5, 10).is_empty());
        assert!(Rect::new(5, 10, 6, 3).is_empty());
        assert_eq!(Rect::new(0, 0, 640, 480), Rect::from_size(640, 480));
    }
}
