//! Video frames as seen by the tracking core.

use std::fmt;

/// A video frame.
///
/// The image payload `I` is opaque to the core: it is only handed to the transform
/// estimator and the pose detector. The core itself only needs the frame size.
#[derive(Clone)]
pub struct Frame<I> {
    /// Image payload (decoded pixels, a GPU handle, a path, ...).
    pub image: I,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Position of the frame in its video.
    pub idx: usize,
    /// Timestamp in microseconds.
    pub usec: i64,
}

impl<I> Frame<I> {
    /// Create a new frame.
    pub fn new(image: I, width: u32, height: u32, idx: usize, usec: i64) -> Self {
        Self { image, width, height, idx, usec }
    }

    /// Size of the frame as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl<I> fmt::Debug for Frame<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("idx", &self.idx)
            .field("usec", &self.usec)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("image", &"<Image>")
            .finish()
    }
}

impl<I> fmt::Display for Frame<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(idx={}, usec={})", self.idx, self.usec)
    }
}

/// Iterator over consecutive `(older, newer)` pairs of a sequence.
pub struct Pairwise<T, It: Iterator<Item = T>> {
    inner: It,
    previous: Option<T>,
}

impl<T: Clone, It: Iterator<Item = T>> Iterator for Pairwise<T, It> {
    type Item = (T, T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.previous.is_none() {
            self.previous = Some(self.inner.next()?);
        }
        let newer = self.inner.next()?;
        let older = self.previous.replace(newer.clone())?;
        Some((older, newer))
    }
}

/// Pair each item with its successor: `[a, b, c]` gives `(a, b), (b, c)`.
///
/// Sequences with fewer than two items give no pairs.
pub fn pairwise<T: Clone, It: IntoIterator<Item = T>>(items: It) -> Pairwise<T, It::IntoIter> {
    Pairwise {
        inner: items.into_iter(),
        previous: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise() {
        let pairs: Vec<_> = pairwise(vec![1, 2, 3, 4]).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_pairwise_short_sequences() {
        assert_eq!(pairwise(Vec::<i32>::new()).count(), 0);
        assert_eq!(pairwise(vec![1]).count(), 0);
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new((), 640, 480, 7, 233_333);
        assert_eq!(frame.to_string(), "Frame(idx=7, usec=233333)");
        assert_eq!(frame.size(), (640, 480));
    }
}
