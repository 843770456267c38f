use super::RendererConfig;

/// Rendering stage. Passes always run in declaration order.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Depth = 0,
    Transparency = 1,
    Overlay = 2,
    DeviceSpaceOverlay = 3,
    ScreenSpaceOverlay = 4,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Depth,
        Pass::Transparency,
        Pass::Overlay,
        Pass::DeviceSpaceOverlay,
        Pass::ScreenSpaceOverlay,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Pass::Depth),
            1 => Some(Pass::Transparency),
            2 => Some(Pass::Overlay),
            3 => Some(Pass::DeviceSpaceOverlay),
            4 => Some(Pass::ScreenSpaceOverlay),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Pass::Depth => "depth",
            Pass::Transparency => "transparency",
            Pass::Overlay => "overlay",
            Pass::DeviceSpaceOverlay => "device_space_overlay",
            Pass::ScreenSpaceOverlay => "screen_space_overlay",
        }
    }

    pub const fn space(self) -> ProjectionSpace {
        match self {
            Pass::Depth | Pass::Transparency | Pass::Overlay => ProjectionSpace::Camera,
            Pass::DeviceSpaceOverlay => ProjectionSpace::Device,
            Pass::ScreenSpaceOverlay => ProjectionSpace::Screen,
        }
    }
}

/// Coordinate space the active projection maps from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionSpace {
    /// Camera view and projection.
    Camera,
    /// Identity: geometry is already in clip space.
    Device,
    /// Orthographic over the viewport in pixels, top-left origin.
    Screen,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullFace {
    Back,
    Front,
}

/// Fixed-function state a pass runs with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: bool,
    pub polygon_offset: Option<PolygonOffset>,
    pub cull: Option<CullFace>,
}

impl PassState {
    /// State restored after the last pass.
    pub const DEFAULTS: Self = Self {
        depth_test: true,
        depth_write: true,
        blend: false,
        polygon_offset: None,
        cull: None,
    };

    pub const DEPTH: Self = Self {
        polygon_offset: Some(PolygonOffset {
            factor: 1.0,
            units: 3.0,
        }),
        ..Self::DEFAULTS
    };

    pub const TRANSPARENCY: Self = Self {
        depth_write: false,
        blend: true,
        ..Self::DEFAULTS
    };

    pub const OVERLAY: Self = Self {
        depth_test: false,
        depth_write: false,
        blend: true,
        ..Self::DEFAULTS
    };

    pub const DEVICE_SPACE_OVERLAY: Self = Self::OVERLAY;

    pub const SCREEN_SPACE_OVERLAY: Self = Self::OVERLAY;
}

/// State profile for every pass, built once from the renderer config.
#[derive(Debug, Clone, PartialEq)]
pub struct PassTable {
    states: [PassState; 5],
}

impl PassTable {
    pub fn new(config: &RendererConfig) -> Self {
        let depth = PassState {
            polygon_offset: config.polygon_offset,
            cull: config.cull_back_faces.then_some(CullFace::Back),
            ..PassState::DEPTH
        };
        Self {
            states: [
                depth,
                PassState::TRANSPARENCY,
                PassState::OVERLAY,
                PassState::DEVICE_SPACE_OVERLAY,
                PassState::SCREEN_SPACE_OVERLAY,
            ],
        }
    }

    #[inline]
    pub fn state(&self, pass: Pass) -> &PassState {
        &self.states[pass.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pass, &PassState)> {
        Pass::ALL.into_iter().zip(self.states.iter())
    }
}

impl Default for PassTable {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}
