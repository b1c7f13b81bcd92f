/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Camera over graph space: pan offset, zoom factor, and the padded visible
//! rectangle the virtualizer culls against.
//!
//! Projection convention: `screen = graph * zoom + pan`. The padding margin
//! is specified in screen pixels and converted to graph units at the current
//! zoom, so the cull margin stays visually constant.

use euclid::default::{Point2D, Rect, Size2D, Vector2D};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Screen-pixel margin added around the visible rectangle.
pub const DEFAULT_PADDING: f32 = 160.0;

/// Screen-pixel margin kept around the graph when fitting to screen.
const FIT_MARGIN: f32 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pan: Vector2D<f32>,
    zoom: f32,
    screen_size: Size2D<f32>,
    padding: f32,
}

impl Viewport {
    pub fn new(screen_size: Size2D<f32>) -> Self {
        Self {
            pan: Vector2D::zero(),
            zoom: 1.0,
            screen_size,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(screen_size: Size2D<f32>, padding: f32) -> Self {
        Self {
            padding,
            ..Self::new(screen_size)
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vector2D<f32> {
        self.pan
    }

    pub fn screen_size(&self) -> Size2D<f32> {
        self.screen_size
    }

    pub fn resize(&mut self, screen_size: Size2D<f32>) {
        self.screen_size = screen_size;
    }

    /// Translate by a screen-space delta (drag-to-pan).
    pub fn pan_by(&mut self, delta: Vector2D<f32>) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the graph point under `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point2D<f32>, factor: f32) {
        let pivot = self.screen_to_graph(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor.to_vector() - pivot.to_vector() * self.zoom;
    }

    /// Set an absolute zoom level, anchored at the screen center.
    pub fn set_zoom(&mut self, zoom: f32) {
        let center = Point2D::new(self.screen_size.width / 2.0, self.screen_size.height / 2.0);
        let pivot = self.screen_to_graph(center);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = center.to_vector() - pivot.to_vector() * self.zoom;
    }

    pub fn screen_to_graph(&self, point: Point2D<f32>) -> Point2D<f32> {
        ((point.to_vector() - self.pan) / self.zoom).to_point()
    }

    pub fn graph_to_screen(&self, point: Point2D<f32>) -> Point2D<f32> {
        (point.to_vector() * self.zoom + self.pan).to_point()
    }

    /// Visible rectangle in graph space, inflated by the padding margin.
    pub fn visible_rect(&self) -> Rect<f32> {
        let origin = self.screen_to_graph(Point2D::zero());
        let size = Size2D::new(
            self.screen_size.width / self.zoom,
            self.screen_size.height / self.zoom,
        );
        let margin = self.padding / self.zoom;
        Rect::new(origin, size).inflate(margin, margin)
    }

    /// Pan and zoom so `bounds` fills the screen with a fixed margin.
    /// An empty target resets the camera.
    pub fn fit_to_rect(&mut self, bounds: Rect<f32>) {
        if bounds.size.width <= 0.0 || bounds.size.height <= 0.0 {
            self.pan = Vector2D::zero();
            self.zoom = 1.0;
            return;
        }
        let usable_width = (self.screen_size.width - 2.0 * FIT_MARGIN).max(1.0);
        let usable_height = (self.screen_size.height - 2.0 * FIT_MARGIN).max(1.0);
        let zoom = (usable_width / bounds.size.width)
            .min(usable_height / bounds.size.height)
            .clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = zoom;

        let bounds_center = bounds.origin + bounds.size.to_vector() / 2.0;
        let screen_center =
            Vector2D::new(self.screen_size.width / 2.0, self.screen_size.height / 2.0);
        self.pan = screen_center - bounds_center.to_vector() * zoom;
    }
}
