//! Pure dimension arithmetic for the resize passes.
//!
//! Neither function ever asks for a result larger than the source image.

/// Largest size with the source aspect ratio that fits inside `bound`.
///
/// Images already inside the bound are returned unchanged. A zero bound is
/// treated as one pixel.
///
/// ```
/// # use imgvault_processing::image::calculations::fit_within;
/// assert_eq!(fit_within((1000, 500), (500, 500)), (500, 250));
/// assert_eq!(fit_within((200, 100), (500, 500)), (200, 100));
/// ```
pub fn fit_within(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = (bound.0.max(1), bound.1.max(1));

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

/// Crop box for a center crop of shape `target`, shrunk uniformly when the
/// source cannot cover it without upscaling. A zero target side is treated
/// as one pixel.
///
/// ```
/// # use imgvault_processing::image::calculations::fill_target;
/// assert_eq!(fill_target((500, 250), (150, 150)), (150, 150));
/// assert_eq!(fill_target((200, 100), (150, 150)), (100, 100));
/// ```
pub fn fill_target(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = (target.0.max(1), target.1.max(1));

    let scale = f64::min(
        1.0,
        f64::min(src_w as f64 / tgt_w as f64, src_h as f64 / tgt_h as f64),
    );
    if scale >= 1.0 {
        return (tgt_w, tgt_h);
    }

    let w = ((tgt_w as f64 * scale).round() as u32).clamp(1, src_w.max(1));
    let h = ((tgt_h as f64 * scale).round() as u32).clamp(1, src_h.max(1));
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_landscape_is_width_bound() {
        assert_eq!(fit_within((2000, 1000), (500, 500)), (500, 250));
    }

    #[test]
    fn fit_portrait_is_height_bound() {
        assert_eq!(fit_within((600, 1200), (500, 500)), (250, 500));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within((10, 10), (500, 500)), (10, 10));
        assert_eq!(fit_within((500, 500), (500, 500)), (500, 500));
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within((10_000, 1), (500, 500)), (500, 1));
    }

    #[test]
    fn fit_zero_bound_does_not_panic() {
        assert_eq!(fit_within((40, 40), (0, 500)), (1, 1));
        assert_eq!(fit_within((40, 20), (0, 0)), (1, 1));
    }

    #[test]
    fn fill_large_source_gets_exact_target() {
        assert_eq!(fill_target((1920, 1080), (150, 150)), (150, 150));
        assert_eq!(fill_target((150, 150), (150, 150)), (150, 150));
    }

    #[test]
    fn fill_small_source_shrinks_to_short_edge() {
        assert_eq!(fill_target((120, 400), (150, 150)), (120, 120));
        assert_eq!(fill_target((1, 1), (150, 150)), (1, 1));
    }

    #[test]
    fn fill_zero_target_does_not_panic() {
        assert_eq!(fill_target((40, 40), (0, 0)), (1, 1));
        assert_eq!(fill_target((0, 0), (150, 150)), (1, 1));
    }

    #[test]
    fn fill_non_square_target_keeps_shape() {
        assert_eq!(fill_target((100, 1000), (200, 100)), (100, 50));
    }
}
