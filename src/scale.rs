use crate::ir::Scale;

/// Build a continuous scale over the finite values, padded 5% each side
pub fn build_scale(values: impl IntoIterator<Item = f64>) -> Scale {
    let mm = min_max(values);
    Scale {
        domain: pad_range(mm.min, mm.max),
    }
}

#[derive(Debug, Clone, Copy)]
struct MinMax {
    min: f64,
    max: f64,
}

fn min_max(values: impl IntoIterator<Item = f64>) -> MinMax {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for val in values.into_iter().filter(|v| v.is_finite()) {
        if val < min { min = val; }
        if val > max { max = val; }
    }

    // Nothing to plot
    if min == f64::INFINITY { min = 0.0; max = 1.0; }

    MinMax { min, max }
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}
