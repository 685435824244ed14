// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Software rendering back end
//!
//! The [`Rasterizer`] owns the per-pixel pipeline state (clip rectangle and
//! mask settings) and draws into a borrowed VRAM slice, so the GPU can hand
//! it `&mut self.vram` while keeping its own command state separate.

mod line;
mod rasterizer;
mod texture;

pub use rasterizer::{Rasterizer, ShadedVertex, Texture};
pub use texture::{modulate, sample_texel};
