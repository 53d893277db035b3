use std::cell::RefCell;


// Slightly adjusted macro from https://docs.rs/once_cell/latest/once_cell/#lazily-compiled-regex:
#[macro_export]
macro_rules! once_cell_regex {
    ($re:expr $(,)?) => {{
        static RE: std::sync::OnceLock<regex_lite::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex_lite::Regex::new($re).unwrap())
    }};
}

pub type Point = (f64, f64);

pub fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

// Lazily computed value that can be explicitly invalidated. Used for layout queries that are
// expensive in the browser.
#[derive(Debug)]
pub struct Memo<T> {
    value: RefCell<Option<T>>,
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self { Memo { value: RefCell::new(None) } }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> T {
        if let Some(v) = self.value.borrow().as_ref() {
            return v.clone();
        }
        let v = compute();
        *self.value.borrow_mut() = Some(v.clone());
        v
    }

    pub fn clear(&self) { self.value.borrow_mut().take(); }

    pub fn is_cached(&self) -> bool { self.value.borrow().is_some() }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self { Memo::new() }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn memo() {
        let calls = Cell::new(0);
        let memo = Memo::new();
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };
        assert_eq!(memo.get_or_compute(compute), 42);
        assert_eq!(memo.get_or_compute(compute), 42);
        assert_eq!(calls.get(), 1);
        memo.clear();
        assert!(!memo.is_cached());
        assert_eq!(memo.get_or_compute(compute), 42);
        assert_eq!(calls.get(), 2);
    }
}
