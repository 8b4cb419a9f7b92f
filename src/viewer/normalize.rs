//! Expanding image parameters across split channels.

use std::iter;

use crate::constants::{CYMRGB, MAGENTA_GREEN};
use crate::layers::{Blending, ContrastLimits, ImageParams, OneOrMany};

type Values<T> = Box<dyn Iterator<Item = T>>;

/// Resolve a possibly negative axis against `ndim` dimensions.
pub(crate) fn resolve_axis(axis: isize, ndim: usize) -> Option<usize> {
    let ndim = isize::try_from(ndim).ok()?;
    let resolved = if axis < 0 { ndim + axis } else { axis };
    (0..ndim).contains(&resolved).then_some(resolved as usize)
}

/// Colormaps used when none is given for `n` channels.
fn default_colormaps(n: usize) -> Values<String> {
    let names: &'static [&'static str] = if n < 3 { &MAGENTA_GREEN } else { &CYMRGB };
    Box::new(names.iter().cycle().map(|name| name.to_string()))
}

fn optional<T: Clone + 'static>(value: Option<OneOrMany<T>>) -> Values<Option<T>> {
    match value {
        Some(value) => Box::new(value.into_iter_repeating().map(Some)),
        None => Box::new(iter::repeat(None)),
    }
}

fn contrast_limits(value: Option<ContrastLimits>) -> Values<Option<[f64; 2]>> {
    match value {
        Some(ContrastLimits::Shared(limits)) => Box::new(iter::repeat(Some(limits))),
        Some(ContrastLimits::PerChannel(limits)) => Box::new(limits.into_iter().map(Some)),
        None => Box::new(iter::repeat(None)),
    }
}

/// Parameters for each of `n` split channels.
///
/// Single values repeat; sequences give one entry per channel. Sequences are
/// not length checked: the shortest one bounds the number of channels.
/// Channels blend additively unless a blending is given.
pub(crate) fn split_params(params: ImageParams, n: usize) -> Vec<ImageParams> {
    let ImageParams {
        colormap,
        contrast_limits: limits,
        gamma,
        name,
        mut common,
        ..
    } = params.clone();
    common.blending.get_or_insert(Blending::Additive);

    let colormaps = match colormap {
        Some(colormap) => colormap.into_iter_repeating(),
        None => default_colormaps(n),
    };

    (0..n)
        .zip(colormaps)
        .zip(contrast_limits(limits))
        .zip(optional(gamma))
        .zip(optional(name))
        .map(|((((_, colormap), limits), gamma), name)| ImageParams {
            channel_axis: None,
            colormap: Some(OneOrMany::One(colormap)),
            contrast_limits: limits.map(ContrastLimits::Shared),
            gamma: gamma.map(OneOrMany::One),
            name: name.map(OneOrMany::One),
            common: common.clone(),
            path: None,
            ..params.clone()
        })
        .collect()
}
