// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };

use std::ops;

/// Row-major RGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<Vector3f>
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![Vector3f::zeros(); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[Vector3f] {
        &self.data
    }

    pub fn raw_copy(&self) -> Vec<(Float, Float, Float)> {
        self.data.iter().map(|p| (p.x, p.y, p.z)).collect()
    }

    pub fn average(&self) -> Vector3f {
        if self.data.is_empty() {
            return Vector3f::zeros();
        }
        let sum = self.data.iter().fold(Vector3f::zeros(), |acc, p| acc + p);
        sum / (self.data.len() as Float)
    }
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector3f;

    fn index(&self, (x, y): (usize, usize)) -> &Vector3f {
        &self.data[y * self.width + x]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Vector3f {
        &mut self.data[y * self.width + x]
    }
}
