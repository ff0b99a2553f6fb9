// Copyright 2020 TwoCookingMice

use std::env;
use std::error::Error;
use std::sync::Arc;

use log::info;

use lumen::core::config::RenderConfig;
use lumen::core::entity::Entity;
use lumen::core::film::Film;
use lumen::core::material::Material;
use lumen::core::medium::{ Medium, MediumInterface };
use lumen::core::scene::{ Scene, SceneBuilder };
use lumen::core::texture::Texture;
use lumen::core::volume::Volume;
use lumen::emitters::sky::SkyEmitter;
use lumen::integrators::path::PathTracingIntegrator;
use lumen::io::exr_utils;
use lumen::materials::diffuse::DiffuseMaterial;
use lumen::materials::glass::GlassMaterial;
use lumen::materials::invisible::InvisibleSurface;
use lumen::materials::mirror::MirrorMaterial;
use lumen::materials::plastic::PlasticMaterial;
use lumen::materials::rough_glass::RoughGlassMaterial;
use lumen::materials::subsurface::SubsurfaceMaterial;
use lumen::math::aabb::AABB;
use lumen::math::constants::{ Float, Vector3f };
use lumen::math::spectrum::RGBSpectrum;
use lumen::media::heterogeneous_medium::HeterogeneousMedium;
use lumen::renderers::path_tracer::PathTracerRenderer;
use lumen::renderers::renderer::Renderer;
use lumen::reporters::console::ConsoleReporter;
use lumen::samplers::independent::IndependentSampler;
use lumen::sensors::perspective::PerspectiveCamera;
use lumen::shapes::quad::Quad;
use lumen::shapes::sphere::Sphere;
use lumen::textures::checker::CheckerTexture;
use lumen::textures::constant::ConstantTexture;
use lumen::volumes::grid_volume::GridVolume;
use lumen::volumes::const_volume::ConstantVolume;

fn constant(r: Float, g: Float, b: Float) -> Arc<dyn Texture> {
    Arc::new(ConstantTexture::new(RGBSpectrum::new(r, g, b)))
}

/// Soft ball of smoke: density falls off from the centre of its box.
fn smoke_density(bbox: AABB) -> Result<GridVolume, Box<dyn Error>> {
    let n = 16;
    let mut data = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let p = Vector3f::new(x as Float, y as Float, z as Float) / (n - 1) as Float
                    - Vector3f::repeat(0.5);
                data.push((1.0 - 2.0 * p.norm()).max(0.0));
            }
        }
    }
    Ok(GridVolume::new((n, n, n), 1, data, bbox)?)
}

fn build_scene(config: &RenderConfig) -> Result<Scene, Box<dyn Error>> {
    let mut builder = SceneBuilder::new();

    let floor: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(Arc::new(CheckerTexture::new(
        RGBSpectrum::splat(0.8), RGBSpectrum::splat(0.2), 8.0))));
    builder.add_entity(Entity::new(
        Arc::new(Quad::new(Vector3f::new(-4.0, 0.0, -4.0), Vector3f::new(0.0, 0.0, 8.0), Vector3f::new(8.0, 0.0, 0.0))),
        floor).with_name("floor"));

    let light: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(constant(0.0, 0.0, 0.0)));
    builder.add_entity(Entity::new(
        Arc::new(Quad::new(Vector3f::new(-0.5, 3.5, -0.5), Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0))),
        light).with_emission(RGBSpectrum::splat(20.0)).with_name("ceiling light"));

    let red: Arc<dyn Material> = Arc::new(DiffuseMaterial::new(constant(0.8, 0.2, 0.2)));
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(-1.6, 0.6, 0.0), 0.6)), red)
        .with_name("diffuse ball"));

    let mirror: Arc<dyn Material> = Arc::new(MirrorMaterial::new(constant(0.9, 0.9, 0.9)));
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.6, -1.0), 0.6)), mirror)
        .with_name("mirror ball"));

    let glass: Arc<dyn Material> = Arc::new(GlassMaterial::new(1.5, constant(1.0, 1.0, 1.0), constant(1.0, 1.0, 1.0))?);
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(1.6, 0.6, 0.0), 0.6)), glass)
        .with_name("glass ball"));

    let frosted: Arc<dyn Material> = Arc::new(RoughGlassMaterial::new(
        1.5, constant(0.25, 0.25, 0.25), constant(1.0, 1.0, 1.0), constant(0.9, 1.0, 0.95))?);
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(1.7, 0.4, 1.6), 0.4)), frosted)
        .with_name("frosted ball"));

    let lacquer: Arc<dyn Material> = Arc::new(
        PlasticMaterial::new(constant(0.1, 0.3, 0.7), 1.0, 0.5, 0.35).with_clearcoat(1.0, 0.8));
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(-1.7, 0.4, 1.6), 0.4)), lacquer)
        .with_name("lacquered ball"));

    let skin: Arc<dyn Material> = Arc::new(SubsurfaceMaterial::new(1.33, constant(0.9, 0.6, 0.5), constant(0.3, 0.15, 0.1))?);
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.5, 1.2), 0.5)), skin)
        .with_name("translucent ball"));

    let smoke_box = AABB::new(Vector3f::new(-0.7, 1.5, -0.7), Vector3f::new(0.7, 2.9, 0.7));
    let density: Arc<dyn Volume> = Arc::new(smoke_density(smoke_box)?);
    let albedo: Arc<dyn Volume> = Arc::new(ConstantVolume::uniform(0.9));
    let smoke: Arc<dyn Medium> = Arc::new(HeterogeneousMedium::new(density, albedo, 6.0, 0.3)?);
    builder.add_entity(Entity::new(Arc::new(Sphere::new(Vector3f::new(0.0, 2.2, 0.0), 0.7)), Arc::new(InvisibleSurface::new()))
        .with_medium_interface(MediumInterface::new(Some(smoke), None))
        .with_name("smoke"));

    builder.add_light(Box::new(SkyEmitter::new(RGBSpectrum::new(0.3, 0.4, 0.6), RGBSpectrum::splat(0.05))));

    let aspect = config.film.width as Float / config.film.height as Float;
    let camera = PerspectiveCamera::new(Vector3f::new(0.0, 2.0, 7.0), Vector3f::new(0.0, 1.0, 0.0),
                                        Vector3f::new(0.0, 1.0, 0.0), 40.0_f32.to_radians(), aspect)?;
    builder.set_camera(Box::new(camera));

    Ok(builder.build(&config.bvh)?)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], i: usize, name: &str) -> Result<T, Box<dyn Error>> {
    args.get(i)
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| format!("missing or invalid value for {}", name).into())
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(format!("Usage: {} <output.exr> [config.toml] [--spp N] [--threads N] [--max-depth N] [--seed N] [--grid N]",
                           args[0]).into());
    }
    let output_path = &args[1];

    let mut i = 2;
    let mut config = match args.get(2) {
        Some(path) if !path.starts_with("--") => {
            i = 3;
            RenderConfig::from_toml_str(&std::fs::read_to_string(path)?)?
        }
        _ => RenderConfig::default(),
    };

    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                config.sampler.samples_per_pixel = parse_flag(&args, i, "--spp")?;
            }
            "--threads" => {
                i += 1;
                config.renderer.worker_count = parse_flag(&args, i, "--threads")?;
            }
            "--max-depth" => {
                i += 1;
                config.path_tracing.max_depth = parse_flag(&args, i, "--max-depth")?;
                config.path_tracing.min_depth = config.path_tracing.min_depth.min(config.path_tracing.max_depth);
            }
            "--seed" => {
                i += 1;
                config.sampler.seed = parse_flag(&args, i, "--seed")?;
            }
            "--grid" => {
                i += 1;
                config.renderer.task_grid_size = parse_flag(&args, i, "--grid")?;
            }
            other => log::warn!("ignoring unknown argument {}", other),
        }
        i += 1;
    }
    config.validate()?;

    let scene = Arc::new(build_scene(&config)?);
    let film = Arc::new(Film::new(&config.film)?);
    let integrator = Arc::new(PathTracingIntegrator::new(config.path_tracing.clone())?);
    let sampler = Arc::new(IndependentSampler::new(config.sampler.samples_per_pixel as u32, config.sampler.seed));
    let mut renderer = PathTracerRenderer::new(integrator, sampler, config.renderer.clone())?
        .with_seed(config.sampler.seed);

    renderer.render(scene, Arc::new(ConsoleReporter::new()), film.clone())?;

    exr_utils::write_exr_to_file(&film.image(), output_path)?;
    let stem = output_path.trim_end_matches(".exr");
    exr_utils::write_exr_to_file(&film.albedo_image(), &format!("{}_albedo.exr", stem))?;
    exr_utils::write_exr_to_file(&film.normal_image(), &format!("{}_normal.exr", stem))?;
    info!("done.");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
