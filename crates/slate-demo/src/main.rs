use anyhow::Result;

use slate_engine::logging::{init_logging, LoggingConfig};
use slate_engine::{
    Color, Engine, EngineConfig, Key, MouseButton, Rect, SpriteOptions, TextureHandle, UvRect, Vec2,
};

const CHECKER_SIZE: u32 = 64;
const CAMERA_SPEED: f32 = 300.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut engine = Engine::create(EngineConfig {
        title: "slate demo".to_string(),
        ..Default::default()
    })?;

    let checker = checkerboard(&mut engine);
    let font = engine.renderer_mut().load_default_font(20.0);
    if !font.is_valid() {
        log::warn!("no system font found; text is disabled");
    }

    let mut fullscreen = false;
    let mut spin = 0.0f32;

    while engine.poll_and_advance() {
        let dt = engine.delta_time();
        spin += 90.0 * dt;

        if engine.key_pressed(Key::Escape) {
            break;
        }
        if engine.key_pressed(Key::F11) {
            fullscreen = !fullscreen;
            engine.set_fullscreen(fullscreen);
        }

        let mut pan = Vec2::zero();
        if engine.key_down(Key::A) || engine.key_down(Key::Left) {
            pan.x -= 1.0;
        }
        if engine.key_down(Key::D) || engine.key_down(Key::Right) {
            pan.x += 1.0;
        }
        if engine.key_down(Key::W) || engine.key_down(Key::Up) {
            pan.y -= 1.0;
        }
        if engine.key_down(Key::S) || engine.key_down(Key::Down) {
            pan.y += 1.0;
        }

        let wheel = engine.mouse_wheel_delta();
        let (mx, my) = (engine.mouse_x(), engine.mouse_y());
        let clicked = engine.mouse_button_pressed(MouseButton::Left);
        let fps = engine.fps();
        let (width, height) = (engine.width() as f32, engine.height() as f32);

        let r = engine.renderer_mut();

        let cam = *r.camera();
        let step = CAMERA_SPEED * dt / cam.zoom();
        r.set_camera_position(cam.position() + Vec2::new(pan.x * step, pan.y * step));
        if wheel != 0.0 {
            r.set_camera_zoom(cam.zoom() * 1.1f32.powf(wheel));
        }
        if clicked {
            r.reset_camera();
        }

        r.clear(Color::rgb(0.08, 0.09, 0.12));

        // World content.
        r.draw_sprite(checker, Rect::new(40.0, 40.0, 128.0, 128.0));
        r.draw_sprite_region(
            checker,
            Rect::new(200.0, 40.0, 64.0, 64.0),
            UvRect::new(0.0, 0.0, 0.5, 0.5),
        );
        r.draw_sprite_flip(checker, Rect::new(280.0, 40.0, 64.0, 128.0), true, false);
        r.draw_sprite_ex(
            checker,
            Rect::new(420.0, 60.0, 96.0, 96.0),
            &SpriteOptions {
                rotation_degrees: spin,
                pivot: Vec2::new(0.5, 0.5),
                tint: Color::rgb(1.0, 0.7, 0.7),
                ..Default::default()
            },
        );

        r.fill_rect(Rect::new(40.0, 220.0, 120.0, 60.0), Color::rgb(0.2, 0.6, 0.9));
        r.draw_rect(Rect::new(180.0, 220.0, 120.0, 60.0), Color::WHITE);
        r.fill_circle(Vec2::new(380.0, 250.0), 30.0, Color::rgb(0.9, 0.8, 0.2));
        r.draw_circle(Vec2::new(460.0, 250.0), 30.0, Color::rgb(0.9, 0.3, 0.3));
        r.draw_line(Vec2::new(40.0, 320.0), Vec2::new(300.0, 360.0), Color::WHITE);
        r.draw_line_width(
            Vec2::new(40.0, 380.0),
            Vec2::new(300.0, 420.0),
            6.0,
            Color::rgb(0.4, 0.9, 0.4),
        );
        r.fill_triangle(
            Vec2::new(360.0, 420.0),
            Vec2::new(420.0, 320.0),
            Vec2::new(480.0, 420.0),
            Color::rgb(0.6, 0.4, 0.9),
        );
        r.draw_triangle(
            Vec2::new(500.0, 420.0),
            Vec2::new(560.0, 320.0),
            Vec2::new(620.0, 420.0),
            Color::WHITE,
        );

        // Clipped content: the circle is cut by the clip rectangle.
        r.clip_begin(Rect::new(40.0, 460.0, 160.0, 80.0));
        r.fill_circle(Vec2::new(120.0, 540.0), 70.0, Color::rgb(0.9, 0.5, 0.1));
        r.clip_end();

        let world = r.screen_to_world(Vec2::new(mx, my));
        r.fill_circle(world, 4.0, Color::rgb(1.0, 0.2, 0.6));

        // Screen-space overlay.
        let cam = *r.camera();
        r.reset_camera();
        if font.is_valid() {
            let line = format!("{fps:.0} fps  zoom {:.2}", cam.zoom());
            r.draw_text(font, &line, 12.0, 28.0, Color::WHITE);

            let hint = "WASD/arrows pan, wheel zooms, click resets, F11 fullscreen";
            let w = r.text_width(font, hint);
            r.draw_text(font, hint, width - w - 12.0, height - 12.0, Color::rgba(1.0, 1.0, 1.0, 0.6));
        }
        r.set_camera_position(cam.position());
        r.set_camera_zoom(cam.zoom());
        r.set_camera_rotation(cam.rotation_degrees());

        r.present();
    }

    Ok(())
}

/// Two-tone checkerboard generated in memory.
fn checkerboard(engine: &mut Engine) -> TextureHandle {
    let cell = CHECKER_SIZE / 8;
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let v = if light { 230 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    engine
        .renderer_mut()
        .load_texture_rgba(&pixels, CHECKER_SIZE, CHECKER_SIZE)
}
