// Copyright 2025 eraflo
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

use super::command::Command;
use super::native::GlContext;
use serde::{Deserialize, Serialize};

/// The output of one recording session.
///
/// `commands` is what executes. `restore` holds the commands that undo the
/// state the currently bound pipeline changed; it is appended to `commands`
/// when that pipeline is replaced or its render pass ends, so a sealed list
/// always has an empty restore list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandList {
    commands: Vec<Command>,
    restore: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub(crate) fn push_restore(&mut self, command: Command) {
        self.restore.push(command);
    }

    /// Moves every pending restore command to the end of the list.
    pub(crate) fn flush_restore(&mut self) {
        self.commands.append(&mut self.restore);
    }

    pub(crate) fn clear(&mut self) {
        self.commands.clear();
        self.restore.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn pending_restore(&self) -> &[Command] {
        &self.restore
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Executes every command in order.
    ///
    /// Execution reads nothing but the commands themselves, so executing the
    /// same list twice issues the same native calls twice.
    pub fn execute(&self, gl: &mut dyn GlContext) {
        for command in &self.commands {
            log::trace!("Executing {:?}", command);
            command.execute(gl);
        }
    }

    /// Captures the list as JSON, for replay or inspection.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Loads a list captured with [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::renderer::api::pass::Viewport;
    use stratum_core::math::Extent2D;

    #[test]
    fn test_flush_restore_appends_in_order() {
        let mut list = CommandList::new();
        list.push(Command::UnbindUniformBuffer(9));
        list.push_restore(Command::UnbindUniformBuffer(1));
        list.push_restore(Command::UnbindUniformBuffer(2));
        assert_eq!(list.len(), 1);
        assert_eq!(list.pending_restore().len(), 2);

        list.flush_restore();
        assert!(list.pending_restore().is_empty());
        assert_eq!(
            list.commands(),
            &[
                Command::UnbindUniformBuffer(9),
                Command::UnbindUniformBuffer(1),
                Command::UnbindUniformBuffer(2),
            ]
        );
    }

    #[test]
    fn test_json_capture() {
        let mut list = CommandList::new();
        list.push(Command::SetViewport(Viewport::full(Extent2D::new(64, 32))));
        list.push(Command::StoreData {
            buffer: super::super::native::GlBuffer(std::num::NonZeroU32::new(4).unwrap()),
            offset: 8,
            data: vec![1, 2, 3],
        });

        let json = list.to_json().unwrap();
        let loaded = CommandList::from_json(&json).unwrap();
        assert_eq!(loaded, list);
    }
}
