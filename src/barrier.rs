// 🚧 Barrier - deferred materialization for join and group stages
//
// Map stages are plain iterator adapters and stay lazy for free. Joins and
// group-bys have to see their whole build side before yielding anything, so
// that work is wrapped here and only runs on the first pull.

/// Iterator whose rows are produced by a one-shot build step
pub struct Barrier<F, I> {
    build: Option<F>,
    rows: Option<I>,
}

impl<F, I> Iterator for Barrier<F, I>
where
    F: FnOnce() -> I,
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(build) = self.build.take() {
            self.rows = Some(build());
        }
        self.rows.as_mut()?.next()
    }
}

/// Defer `build` until the first row is requested
pub fn barrier<F, I>(build: F) -> Barrier<F, I>
where
    F: FnOnce() -> I,
    I: Iterator,
{
    Barrier {
        build: Some(build),
        rows: None,
    }
}
