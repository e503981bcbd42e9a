use burn_ndarray::NdArray;
use slicereg_core::volume::plane_to_vec;
use slicereg_core::{Atlas, CoreError, Point3, Volume};

type Backend = NdArray<f32>;

/// Volume whose value encodes its own index: 100*i + 10*j + k.
fn coded_atlas(shape: [usize; 3], resolution_um: f64) -> Atlas<Backend> {
    let [d0, d1, d2] = shape;
    let mut values = Vec::with_capacity(d0 * d1 * d2);
    for i in 0..d0 {
        for j in 0..d1 {
            for k in 0..d2 {
                values.push((100 * i + 10 * j + k) as f32);
            }
        }
    }
    Atlas::new(Volume::from_vec(values, shape, &Default::default()).unwrap(), resolution_um).unwrap()
}

#[test]
fn test_orthogonal_section_shapes() {
    let atlas = coded_atlas([4, 5, 6], 10.0);
    let sections = atlas
        .orthogonal_sections_at(&Point3::new([15.0, -25.0, 35.0]))
        .unwrap()
        .unwrap();
    assert_eq!(sections.index, [2, 1, 3]);
    assert_eq!(sections.coronal.dims(), [5, 6]);
    assert_eq!(sections.axial.dims(), [4, 6]);
    assert_eq!(sections.sagittal.dims(), [4, 5]);
}

#[test]
fn test_orthogonal_section_values() {
    let atlas = coded_atlas([3, 3, 3], 10.0);
    let sections = atlas
        .orthogonal_sections_at(&Point3::new([10.0, -20.0, 0.0]))
        .unwrap()
        .unwrap();
    assert_eq!(sections.index, [2, 1, 0]);

    let coronal = plane_to_vec(&sections.coronal);
    assert!(coronal.iter().all(|v| (*v as usize) / 100 == 2));

    let axial = plane_to_vec(&sections.axial);
    assert!(axial.iter().all(|v| ((*v as usize) / 10) % 10 == 1));

    let sagittal = plane_to_vec(&sections.sagittal);
    assert_eq!(sagittal, vec![0.0, 10.0, 20.0, 100.0, 110.0, 120.0, 200.0, 210.0, 220.0]);
}

#[test]
fn test_orthogonal_sections_leave_volume_untouched() {
    let atlas = coded_atlas([3, 3, 3], 10.0);
    let before = atlas.volume().to_vec();
    let _ = atlas.orthogonal_sections_at(&Point3::new([10.0, -10.0, 10.0])).unwrap();
    assert_eq!(atlas.volume().to_vec(), before);
}

#[test]
fn test_orthogonal_sections_overflow_is_out_of_bounds() {
    let atlas = coded_atlas([3, 3, 3], 10.0);
    let result = atlas.orthogonal_sections_at(&Point3::new([5.0, -5.0, 300.0]));
    assert!(matches!(result, Err(CoreError::OutOfBounds { .. })));
}

#[test]
fn test_annotation_sections_use_annotation_volume() {
    let atlas = coded_atlas([3, 3, 3], 10.0);
    let labels = Volume::<Backend>::from_vec(vec![7u8; 27], [3, 3, 3], &Default::default()).unwrap();
    let atlas = atlas.with_annotation(labels).unwrap();
    let sections = atlas
        .annotation_sections_at(&Point3::new([10.0, -10.0, 10.0]))
        .unwrap()
        .unwrap();
    assert!(plane_to_vec(&sections.coronal).iter().all(|v| *v == 7.0));
}

#[test]
fn test_atlas_replacement_does_not_touch_original() {
    let atlas = coded_atlas([2, 2, 2], 10.0);
    let coarser = atlas.with_resolution(20.0).unwrap();
    assert_eq!(atlas.resolution_um(), 10.0);
    assert_eq!(coarser.resolution_um(), 20.0);
    assert_eq!(coarser.volume().to_vec(), atlas.volume().to_vec());
}
