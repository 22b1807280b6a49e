//! Headless backend using the Pixman software renderer
//!
//! Renders the scene into an in-memory buffer and reads individual client
//! textures back as BGRA frames for the embedding host.

use smithay::backend::allocator::Fourcc as DrmFourcc;
use smithay::backend::renderer::damage::OutputDamageTracker;
use smithay::backend::renderer::element::surface::WaylandSurfaceRenderElement;
use smithay::backend::renderer::pixman::PixmanRenderer;
use smithay::backend::renderer::utils::RendererSurfaceStateUserData;
use smithay::backend::renderer::{Bind, ExportMem, ImportAll, Offscreen, Texture};
use smithay::desktop::space::render_output;
use smithay::desktop::{Space, Window};
use smithay::output::{Mode, Output, PhysicalProperties, Subpixel};
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::utils::{Buffer, Logical, Point, Rectangle, Size};
use smithay::wayland::compositor::with_states;
use log::{debug, info, warn};
use pixman::Image;

use crate::frame::{PixelFormat, SurfaceImage};

/// Headless backend that renders to an in-memory Pixman buffer.
pub struct HeadlessBackend {
    renderer: PixmanRenderer,
    buffer: Image<'static, 'static>,
    output: Output,
    damage_tracker: OutputDamageTracker,
}

impl HeadlessBackend {
    /// Create a new headless backend with the given dimensions.
    pub fn new(width: u32, height: u32, refresh_hz: u32) -> Result<Self, Box<dyn std::error::Error>> {
        let mut renderer = PixmanRenderer::new()
            .map_err(|e| format!("Failed to create Pixman renderer: {:?}", e))?;

        let size = Size::from((width as i32, height as i32));
        let buffer: Image<'static, 'static> = renderer
            .create_buffer(DrmFourcc::Xrgb8888, size)
            .map_err(|e| format!("Failed to create offscreen buffer: {:?}", e))?;

        let output = Output::new(
            "waycast-0".to_string(),
            PhysicalProperties {
                size: (0, 0).into(),
                subpixel: Subpixel::Unknown,
                make: "waycast".into(),
                model: "Headless".into(),
            },
        );

        let mode = Mode {
            size: (width as i32, height as i32).into(),
            refresh: refresh_hz as i32 * 1000,
        };
        output.change_current_state(Some(mode), None, None, Some((0, 0).into()));
        output.set_preferred(mode);

        let damage_tracker = OutputDamageTracker::from_output(&output);

        info!(
            "Headless backend created: {}x{} @ {}Hz (Pixman)",
            width, height, refresh_hz
        );

        Ok(Self {
            renderer,
            buffer,
            output,
            damage_tracker,
        })
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Send frame callbacks to all mapped windows so clients keep
    /// submitting.
    pub fn send_frame_callbacks(&self, space: &Space<Window>, elapsed: std::time::Duration) {
        space.elements().for_each(|window| {
            window.send_frame(&self.output, elapsed, None, |_, _| Some(self.output.clone()));
        });
    }

    /// Commit the scene: render the space into the offscreen buffer.
    /// Returns whether the render succeeded.
    pub fn render(&mut self, space: &Space<Window>) -> bool {
        let mut framebuffer = match self.renderer.bind(&mut self.buffer) {
            Ok(fb) => fb,
            Err(e) => {
                warn!("Failed to bind framebuffer: {:?}", e);
                return false;
            }
        };

        // age=0: always full render. Skip logic lives in the caller via
        // Compositor::needs_redraw.
        let render_result = render_output::<_, WaylandSurfaceRenderElement<PixmanRenderer>, _, _>(
            &self.output,
            &mut self.renderer,
            &mut framebuffer,
            1.0,
            0,
            [space],
            &[],
            &mut self.damage_tracker,
            [0.1, 0.1, 0.1, 1.0],
        );

        match render_result {
            Ok(_) => true,
            Err(e) => {
                warn!("Render output failed: {:?}", e);
                false
            }
        }
    }

    /// Read the pixels of a surface's current buffer back as a BGRA frame.
    ///
    /// Returns `None` (after logging) when the surface has no buffer, the
    /// buffer type cannot be imported, or the readback itself fails; the
    /// surface stays alive in every case.
    pub fn readback_surface(
        &mut self,
        surface: &WlSurface,
        geometry_loc: Point<i32, Logical>,
        damage: &[Rectangle<i32, Buffer>],
    ) -> Option<SurfaceImage> {
        let renderer = &mut self.renderer;
        let texture = with_states(surface, |states| {
            let buffer = states
                .data_map
                .get::<RendererSurfaceStateUserData>()
                .and_then(|state| state.lock().ok())
                .and_then(|state| state.buffer().cloned())?;

            match renderer.import_buffer(&buffer, Some(states), damage) {
                Some(Ok(texture)) => Some(texture),
                Some(Err(e)) => {
                    warn!("Failed to import surface buffer: {:?}", e);
                    None
                }
                None => {
                    debug!("Surface buffer has no importable type");
                    None
                }
            }
        })?;

        let (width, height) = (texture.width(), texture.height());
        let region = Rectangle::<i32, Buffer>::new(
            (geometry_loc.x, geometry_loc.y).into(),
            (width as i32, height as i32).into(),
        );

        let mapping = match self
            .renderer
            .copy_texture(&texture, region, PixelFormat::Bgra.fourcc())
        {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!("Failed to read back surface texture: {:?}", e);
                return None;
            }
        };

        match self.renderer.map_texture(&mapping) {
            Ok(data) => Some(SurfaceImage::new(width, height, data.to_vec())),
            Err(e) => {
                warn!("Failed to map texture readback: {:?}", e);
                None
            }
        }
    }
}
