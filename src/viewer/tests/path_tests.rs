//! Tests for opening paths through the reader chain.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use ndarray::{Array2, ArrayD, IxDyn};
use ndarray_npy::write_npy;

use crate::config::ViewerConfig;
use crate::data::LayerDataTuple;
use crate::io::scratch_dir;
use crate::layers::{Layer, LayerKind};
use crate::plugins::ReadRequest;
use crate::viewer::Viewer;

/// A chain that records each request and returns one image per path.
fn recording_chain(
    requests: Rc<RefCell<Vec<Vec<String>>>>,
) -> impl Fn(&ReadRequest<'_>) -> Vec<LayerDataTuple> {
    move |request: &ReadRequest<'_>| {
        let paths: Vec<String> = request.paths().into_iter().map(String::from).collect();
        let n = paths.len();
        requests.borrow_mut().push(paths);
        (0..n)
            .map(|_| LayerDataTuple::new(ArrayD::<f32>::zeros(IxDyn(&[4, 4]))))
            .collect()
    }
}

#[test]
fn test_unstacked_paths_read_one_by_one_in_order() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut viewer = Viewer::new().with_reader_chain(recording_chain(requests.clone()));

    let ids = viewer
        .add_path(vec!["a.tif", "b.tif", "c.tif"], false)
        .unwrap();

    assert_eq!(ids.len(), 3);
    assert_eq!(viewer.layers().ids(), ids);
    assert_eq!(
        *requests.borrow(),
        vec![vec!["a.tif"], vec!["b.tif"], vec!["c.tif"]]
    );
}

#[test]
fn test_stacked_paths_read_once() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut viewer = Viewer::new().with_reader_chain(recording_chain(requests.clone()));

    viewer.add_path(vec!["z0.tif", "z1.tif"], true).unwrap();
    assert_eq!(*requests.borrow(), vec![vec!["z0.tif", "z1.tif"]]);
}

#[test]
fn test_single_path() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut viewer = Viewer::new().with_reader_chain(recording_chain(requests.clone()));

    viewer.add_path(PathBuf::from("cells.npy"), false).unwrap();
    assert_eq!(*requests.borrow(), vec![vec!["cells.npy"]]);
}

#[test]
fn test_empty_path_lists() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut viewer = Viewer::new().with_reader_chain(recording_chain(requests.clone()));

    assert!(viewer.add_path(Vec::<PathBuf>::new(), false).unwrap().is_empty());
    let err = viewer.add_path(Vec::<PathBuf>::new(), true).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(requests.borrow().is_empty());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_path_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut viewer = Viewer::new().with_reader_chain(recording_chain(requests.clone()));

    let path = PathBuf::from(OsStr::from_bytes(b"bad\xffname.tif"));
    let err = viewer.add_path(vec![PathBuf::from("ok.tif"), path], false).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(requests.borrow().is_empty());
}

#[test]
fn test_open_follows_config() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let mut config = ViewerConfig::new();
    config.stack_paths = true;
    let mut viewer =
        Viewer::with_config(config).with_reader_chain(recording_chain(requests.clone()));

    viewer.open(vec!["z0.tif", "z1.tif"]).unwrap();
    assert_eq!(requests.borrow().len(), 1);
}

#[test]
fn test_builtin_readers_open_npy_files() {
    let dir = scratch_dir("viewer-open");
    let labels = dir.join("labels.npy");
    let image = dir.join("image.npy");
    write_npy(&labels, &Array2::<i64>::zeros((4, 5))).unwrap();
    write_npy(&image, &Array2::<f32>::ones((4, 5))).unwrap();

    let mut viewer = Viewer::new();
    let ids = viewer.add_path(vec![labels, image], false).unwrap();
    let kinds: Vec<LayerKind> = ids
        .iter()
        .filter_map(|id| viewer.layer(*id))
        .map(Layer::kind)
        .collect();
    assert_eq!(kinds, vec![LayerKind::Labels, LayerKind::Image]);
}

#[test]
fn test_builtin_readers_stack_npy_files() {
    let dir = scratch_dir("viewer-stack");
    let paths: Vec<PathBuf> = (0..3).map(|i| dir.join(format!("z{}.npy", i))).collect();
    for path in &paths {
        write_npy(path, &Array2::<f32>::zeros((4, 5))).unwrap();
    }

    let mut viewer = Viewer::new();
    let ids = viewer.add_path(paths, true).unwrap();
    assert_eq!(ids.len(), 1);
    let image = viewer.layer(ids[0]).and_then(Layer::as_image).unwrap();
    assert_eq!(image.data().shape(), &[3, 4, 5]);
}

#[test]
fn test_unreadable_path_adds_nothing() {
    let mut viewer = Viewer::new();
    let ids = viewer.add_path("does/not/exist.unknown", false).unwrap();
    assert!(ids.is_empty());
}
