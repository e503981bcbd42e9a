//! Slice Atlas Example
//!
//! Builds a synthetic 40³ atlas at 25 µm whose intensity encodes the voxel
//! index, loads a section onto it, and slices the atlas along the section in
//! each orientation preset.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example slice_atlas

use burn_ndarray::NdArray;
use slicereg_core::volume::plane_to_vec;
use slicereg_core::{Atlas, Image, Orientation, PoseUpdate, Volume};
use slicereg_registration::{
    AtlasLayer, AtlasSectionsAtSection, InMemoryRepo, LoadAtlas, LoadSection, OrientSection,
    RegisterSection, Registration, SectionRepo, SliceConfig, UpdateSection,
};
use tracing_subscriber::EnvFilter;

type Backend = NdArray<f32>;

const ATLAS_SIZE: usize = 40;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let device = Default::default();

    // 1. Atlas: value 10000*i + 100*j + k, labels split the volume in octants
    let n = ATLAS_SIZE;
    let mut values = Vec::with_capacity(n * n * n);
    let mut labels = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                values.push((10000 * i + 100 * j + k) as f32);
                labels.push((4 * (i / 20) + 2 * (j / 20) + k / 20) as u8);
            }
        }
    }
    let atlas = Atlas::new(Volume::<Backend>::from_vec(values, [n, n, n], &device)?, 25.0)?
        .with_annotation(Volume::from_vec(labels, [n, n, n], &device)?)?;

    let repo = InMemoryRepo::<Backend>::new();
    let atlas = LoadAtlas::new(&repo).execute(atlas);
    println!("Atlas centre: {:?}", atlas.center().to_array());

    // 2. Section: a blank 2-channel 32x32 image at 25 µm
    let image = Image::new(Volume::<Backend>::zeros([2, 32, 32], &device)?, 25.0)?;
    let section = LoadSection::new(&repo).execute(image);
    println!("Section pose after load: {:?}", section.pose());

    // 3. Register in every orientation
    for orientation in [Orientation::Coronal, Orientation::Axial, Orientation::Sagittal] {
        OrientSection::new(&repo).execute::<Backend>(orientation)?;
        let data = RegisterSection::new(&repo).execute::<Backend>()?;
        let pixels = plane_to_vec(&data.atlas_slice_image);
        println!(
            "{:?}: centre voxel {:?}, first row starts {:?}",
            orientation,
            data.atlas_image_coords,
            &pixels[..4]
        );
    }

    // 4. Tilt the section and sample reference + annotation together
    UpdateSection::new(&repo).execute::<Backend>(&PoseUpdate::new().rx(15.0).ry(-10.0))?;
    let section = repo
        .get_section()
        .ok_or_else(|| anyhow::anyhow!("section disappeared from the repository"))?;
    let config = SliceConfig::new()
        .with_layers([AtlasLayer::Reference, AtlasLayer::Annotation])
        .with_background(-1.0);
    let slice = Registration::new(&section, &atlas)?.slice_atlas_with(&config)?;
    let labels = plane_to_vec(&slice.channel(1)?);
    let outside = labels.iter().filter(|v| **v < 0.0).count();
    println!(
        "Tilted slice: {} channels, {} of {} pixels outside the atlas",
        slice.num_channels(),
        outside,
        labels.len()
    );

    if let Some(planes) = AtlasSectionsAtSection::new(&repo).execute::<Backend>()? {
        println!(
            "Orthogonal planes at {:?}: coronal {:?}, axial {:?}, sagittal {:?}",
            planes.index,
            planes.coronal.dims(),
            planes.axial.dims(),
            planes.sagittal.dims()
        );
    }

    Ok(())
}
