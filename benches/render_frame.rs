//! Frame rendering benchmarks over the built-in demo level.
//!
//! Run with: cargo bench --bench render_frame

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use segcast::scaler::Upscaler;
use segcast::visibility::resolve;
use segcast::{DEMO_LEVEL, Framebuffer, Renderer, Scene};

fn demo() -> Scene {
    Scene::from_toml_str(DEMO_LEVEL).expect("demo level parses")
}

fn bench_render(c: &mut Criterion) {
    let scene = demo();
    let mut group = c.benchmark_group("render");

    for &(w, h) in &[(160, 120), (320, 240), (640, 480)] {
        group.throughput(Throughput::Elements((w * h) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &(w, h),
            |b, &(w, h)| {
                let mut renderer = Renderer::new(w, h);
                let mut fb = Framebuffer::new(w, h);
                b.iter(|| {
                    renderer.render(
                        &scene.level,
                        &scene.textures,
                        black_box(&scene.pose),
                        &scene.sprites,
                        &mut fb,
                    );
                    black_box(fb.pixels()[0])
                });
            },
        );
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let scene = demo();
    let walls = scene.level.walls();
    let ray = scene.pose.ray(scene.pose.view_angle_deg);
    c.bench_function("resolve_center_ray", |b| {
        b.iter(|| resolve(black_box(ray), walls).len())
    });
}

fn bench_upscale(c: &mut Criterion) {
    let scene = demo();
    let (w, h) = (320, 240);
    let mut fb = Framebuffer::new(w, h);
    Renderer::new(w, h).render(&scene.level, &scene.textures, &scene.pose, &scene.sprites, &mut fb);

    let mut scaler = Upscaler::new(w, h, 1280, 960);
    let mut surface = vec![0u32; 1280 * 960];
    c.bench_function("upscale_320x240_to_1280x960", |b| {
        b.iter(|| {
            scaler.blit(black_box(&fb), &mut surface);
            scaler.sharpen(&mut surface);
        })
    });
}

criterion_group!(benches, bench_render, bench_resolve, bench_upscale);
criterion_main!(benches);
