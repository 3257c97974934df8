// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::config::Config;
use crate::exec::{ScriptExecutor, VerbCall};
use crate::resolve::{VerbMatch, VerbResolver};
use crate::session::Session;
use loam_common::matching::parse_into_words;
use loam_common::model::{GameObject, ObjKind, WorldError};
use loam_db::ObjectStore;
use loam_var::ObjId;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes raw player input to a verb and runs it.
///
/// Search order: the player's room, the objects in it, the player, the
/// system object. The first verb whose name claims the command decides the
/// outcome; if its pattern rejects, an optional fallback sweep retries
/// capture-bearing patterns against the whole token list.
///
/// Dispatch never panics and never leaks world errors to the caller: a
/// command either ran (possibly failing inside its script) or nothing
/// answered it.
pub struct CommandDispatcher {
    objects: Arc<ObjectStore>,
    resolver: Arc<VerbResolver>,
    executor: Arc<dyn ScriptExecutor>,
    config: Config,
}

impl CommandDispatcher {
    pub fn new(
        objects: Arc<ObjectStore>,
        resolver: Arc<VerbResolver>,
        executor: Arc<dyn ScriptExecutor>,
        config: Config,
    ) -> Self {
        Self {
            objects,
            resolver,
            executor,
            config,
        }
    }

    /// Try to run `input` as a command from `player_id`. Returns whether a
    /// verb answered; a verb that ran and failed still counts as answered.
    /// World errors raised while routing turn into a line to the player.
    pub fn try_execute_verb(&self, input: &str, player_id: &ObjId, session: &dyn Session) -> bool {
        match self.dispatch(input, player_id, session) {
            Ok(handled) => handled,
            Err(e) => {
                error!(player = %player_id, error = %e, "command dispatch failed");
                if let Err(e) =
                    session.send_to_player(player_id, "Something went wrong with that command.")
                {
                    warn!(player = %player_id, error = %e, "could not deliver dispatch error");
                }
                false
            }
        }
    }

    fn dispatch(
        &self,
        input: &str,
        player_id: &ObjId,
        session: &dyn Session,
    ) -> Result<bool, WorldError> {
        let tokens = parse_into_words(input);
        if tokens.is_empty() {
            return Ok(false);
        }

        let Some(player) = self.objects.get_object(player_id)? else {
            return Err(WorldError::ObjectNotFound(player_id.clone()));
        };
        if player.is_ghost() {
            return Err(WorldError::GhostObject(player_id.clone()));
        }

        let room = match player.location() {
            Some(loc) => self.objects.get_object(&loc)?,
            None => None,
        };
        let contents = match &room {
            Some(room) => self.objects.objects_in_location(room.id())?,
            None => vec![],
        };

        if let Some(found) = self.search(&player, room.as_ref(), &contents, &tokens)? {
            self.execute(found, input, player_id, session);
            return Ok(true);
        }
        Ok(false)
    }

    fn search(
        &self,
        player: &GameObject,
        room: Option<&GameObject>,
        contents: &[GameObject],
        tokens: &[String],
    ) -> Result<Option<VerbMatch>, WorldError> {
        let bare = tokens.len() == 1;

        if let Some(room) = room
            && let Some(found) = self.resolver.find_matching_verb(room.id(), tokens)?
        {
            return Ok(Some(found));
        }
        for obj in contents {
            // The player answers in its own later step.
            if obj.id() == player.id() {
                continue;
            }
            if bare && self.config.exits_skip_bare_commands && obj.kind() == ObjKind::Exit {
                continue;
            }
            if let Some(found) = self.resolver.find_matching_verb(obj.id(), tokens)? {
                return Ok(Some(found));
            }
        }
        if let Some(found) = self.resolver.find_matching_verb(player.id(), tokens)? {
            return Ok(Some(found));
        }
        let system = self.objects.system_object()?;
        if let Some(found) = self.resolver.find_matching_verb(system.id(), tokens)? {
            return Ok(Some(found));
        }

        // The sweep only makes sense with arguments in play; a lone word has
        // nothing for a capture template to bind.
        if self.config.fallback_capture_matching && tokens.len() > 1 {
            return self.capture_sweep(player, room, contents, &system, tokens);
        }
        Ok(None)
    }

    /// The last-resort sweep: no verb name claimed the first token, so try
    /// every capture-bearing pattern in reach against the whole token list.
    fn capture_sweep(
        &self,
        player: &GameObject,
        room: Option<&GameObject>,
        contents: &[GameObject],
        system: &GameObject,
        tokens: &[String],
    ) -> Result<Option<VerbMatch>, WorldError> {
        let mut hosts: Vec<&GameObject> = contents.iter().collect();
        if let Some(room) = room {
            hosts.push(room);
        }
        hosts.push(player);
        hosts.push(system);

        for host in hosts {
            for verb in self.resolver.verbs_for_object(host.id(), false)? {
                let Ok(pattern) = verb.compiled_pattern() else {
                    continue;
                };
                if !pattern.has_captures() {
                    continue;
                }
                if let Some(variables) = pattern.match_args(tokens) {
                    return Ok(Some(VerbMatch {
                        verb,
                        this: host.id().clone(),
                        variables,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Run a matched verb. Executor failures are reported to the player and
    /// logged; they never propagate.
    fn execute(&self, found: VerbMatch, input: &str, player_id: &ObjId, session: &dyn Session) {
        let call = VerbCall {
            this: found.this,
            player: player_id.clone(),
            raw_input: input.to_string(),
            variables: found.variables,
            verb: found.verb,
        };
        debug!(
            verb = %call.verb.name(),
            this = %call.this,
            player = %call.player,
            "executing verb"
        );
        match self.executor.execute_verb(&call, session) {
            Ok(output) => {
                if !output.is_empty()
                    && let Err(e) = session.send_to_player(player_id, &output)
                {
                    warn!(player = %player_id, error = %e, "could not deliver verb output");
                }
            }
            Err(e) => {
                error!(
                    verb = %call.verb.name(),
                    this = %call.this,
                    error = %e,
                    "verb execution failed"
                );
                let _ = session.send_to_player(
                    player_id,
                    &format!("Something went wrong running '{}'.", call.verb.name()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ScriptError;
    use crate::resolve::VerbResolver;
    use crate::session::{NoopSession, SessionError};
    use loam_common::model::{ObjectClass, VerbOwner};
    use loam_db::{ClassRegistry, PersistentStore, TransientStore, VerbRegistry};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(String, ObjId, BTreeMap<String, String>)>>,
        fail_with: Option<String>,
    }

    impl ScriptExecutor for RecordingExecutor {
        fn execute_verb(
            &self,
            call: &VerbCall,
            _session: &dyn Session,
        ) -> Result<String, ScriptError> {
            self.calls.lock().unwrap().push((
                call.verb.code().to_string(),
                call.this.clone(),
                call.variables.clone(),
            ));
            match &self.fail_with {
                Some(msg) => Err(ScriptError::Runtime(msg.clone())),
                None => Ok(String::new()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSession {
        sent: Mutex<Vec<String>>,
    }

    impl Session for RecordingSession {
        fn session_id(&self) -> &str {
            "test-session"
        }

        fn send_to_player(&self, _player: &ObjId, message: &str) -> Result<(), SessionError> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn send_to_session(&self, _session_id: &str, message: &str) -> Result<(), SessionError> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct Fixture {
        objects: Arc<ObjectStore>,
        verbs: Arc<VerbRegistry>,
        executor: Arc<RecordingExecutor>,
        dispatcher: CommandDispatcher,
        room_id: ObjId,
        player_id: ObjId,
        sword_id: ObjId,
        exit_id: ObjId,
        wiz: ObjId,
    }

    fn fixture_with(executor: RecordingExecutor) -> Fixture {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let store: Arc<dyn PersistentStore> = Arc::new(TransientStore::new());
        let classes = Arc::new(ClassRegistry::new(store.clone()));
        let objects = Arc::new(ObjectStore::new(store.clone(), classes.clone()));
        let verbs = Arc::new(VerbRegistry::new(store));
        let resolver = Arc::new(VerbResolver::new(objects.clone(), verbs.clone()));
        let executor = Arc::new(executor);
        let dispatcher = CommandDispatcher::new(
            objects.clone(),
            resolver,
            executor.clone(),
            Config::default(),
        );

        let room_class = classes
            .add_class(ObjectClass::new("Room", None, "").with_kind(ObjKind::Room))
            .unwrap();
        let player_class = classes
            .add_class(ObjectClass::new("Player", None, "").with_kind(ObjKind::Player))
            .unwrap();
        let thing_class = classes.create_class("Thing", None, "").unwrap();
        let exit_class = classes
            .add_class(ObjectClass::new("Exit", None, "").with_kind(ObjKind::Exit))
            .unwrap();

        let room = objects.create_instance(room_class.id(), None).unwrap();
        let player = objects
            .create_player("Alice", "hash", player_class.id(), Some(room.id()))
            .unwrap();
        let sword = objects
            .create_instance(thing_class.id(), Some(room.id()))
            .unwrap();
        let exit = objects
            .create_instance(exit_class.id(), Some(room.id()))
            .unwrap();

        Fixture {
            room_id: room.id().clone(),
            player_id: player.object().id().clone(),
            sword_id: sword.id().clone(),
            exit_id: exit.id().clone(),
            wiz: ObjId::mk("wiz"),
            objects,
            verbs,
            executor,
            dispatcher,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingExecutor::default())
    }

    impl Fixture {
        fn add_verb(&self, owner: VerbOwner, name: &str, pattern: &str, code: &str) {
            self.verbs
                .create_verb(owner, name, pattern, code, self.wiz.clone())
                .unwrap();
        }

        fn run(&self, input: &str) -> bool {
            let session = NoopSession::new("s");
            self.dispatcher
                .try_execute_verb(input, &self.player_id, &session)
        }

        fn executed(&self) -> Vec<(String, ObjId, BTreeMap<String, String>)> {
            self.executor.calls.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_room_beats_contents_beats_player() {
        let f = fixture();
        f.add_verb(VerbOwner::Object(f.player_id.clone()), "scan", "", "on-player");
        f.add_verb(VerbOwner::Object(f.sword_id.clone()), "scan", "", "on-sword");
        f.add_verb(VerbOwner::Object(f.room_id.clone()), "scan", "", "on-room");

        assert!(f.run("scan"));
        let calls = f.executed();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "on-room");
        assert_eq!(calls[0].1, f.room_id);
    }

    #[test]
    fn test_contents_beat_player() {
        let f = fixture();
        f.add_verb(VerbOwner::Object(f.player_id.clone()), "rub", "", "on-player");
        f.add_verb(VerbOwner::Object(f.sword_id.clone()), "rub", "", "on-sword");

        assert!(f.run("rub"));
        assert_eq!(f.executed()[0].0, "on-sword");
    }

    #[test]
    fn test_player_beats_system() {
        let f = fixture();
        let system = f.objects.system_object().unwrap();
        f.add_verb(VerbOwner::Object(system.id().clone()), "who", "", "on-system");
        f.add_verb(VerbOwner::Object(f.player_id.clone()), "who", "", "on-player");

        assert!(f.run("who"));
        assert_eq!(f.executed()[0].0, "on-player");
    }

    #[test]
    fn test_system_answers_last() {
        let f = fixture();
        let system = f.objects.system_object().unwrap();
        f.add_verb(VerbOwner::Object(system.id().clone()), "who", "", "on-system");

        assert!(f.run("who"));
        assert_eq!(f.executed()[0].0, "on-system");
    }

    #[test]
    fn test_exits_skip_bare_commands() {
        let f = fixture();
        f.add_verb(VerbOwner::Object(f.exit_id.clone()), "north", "", "on-exit");

        // A single word never reaches an exit object...
        assert!(!f.run("north"));
        // ...but a multi-word command does.
        assert!(f.run("north quickly"));
        assert_eq!(f.executed()[0].0, "on-exit");
    }

    #[test]
    fn test_pattern_captures_reach_the_executor() {
        let f = fixture();
        f.add_verb(
            VerbOwner::Object(f.room_id.clone()),
            "give",
            "{item} to {person}",
            "give-code",
        );

        assert!(f.run("give sword to bob"));
        let (_, _, vars) = &f.executed()[0];
        assert_eq!(vars.get("item"), Some(&"sword".to_string()));
        assert_eq!(vars.get("person"), Some(&"bob".to_string()));

        // The same verb with a non-matching shape goes unanswered.
        assert!(!f.run("give sword"));
        assert_eq!(f.executed().len(), 1);
    }

    #[test]
    fn test_class_verbs_answer_for_instances() {
        let f = fixture();
        let sword = f.objects.get_object(&f.sword_id).unwrap().unwrap();
        f.add_verb(
            VerbOwner::Class(sword.class_id().clone()),
            "polish",
            "",
            "class-code",
        );

        assert!(f.run("polish"));
        assert_eq!(f.executed()[0].1, f.sword_id);
    }

    #[test]
    fn test_fallback_sweep_matches_whole_token_list() {
        let f = fixture();
        // "transfer" never appears in the input; only the sweep can find it.
        f.add_verb(
            VerbOwner::Object(f.sword_id.clone()),
            "transfer",
            "{item} to {person}",
            "sweep-code",
        );

        assert!(f.run("sword to bob"));
        let (code, this, vars) = &f.executed()[0];
        assert_eq!(code, "sweep-code");
        assert_eq!(this, &f.sword_id);
        assert_eq!(vars.get("item"), Some(&"sword".to_string()));
    }

    #[test]
    fn test_fallback_sweep_can_be_disabled() {
        let f = fixture();
        // Rebuild the dispatcher with the sweep off.
        let resolver = Arc::new(VerbResolver::new(f.objects.clone(), f.verbs.clone()));
        let dispatcher = CommandDispatcher::new(
            f.objects.clone(),
            resolver,
            f.executor.clone(),
            Config {
                fallback_capture_matching: false,
                ..Config::default()
            },
        );
        f.add_verb(
            VerbOwner::Object(f.sword_id.clone()),
            "transfer",
            "{item} to {person}",
            "sweep-code",
        );

        let session = NoopSession::new("s");
        assert!(!dispatcher.try_execute_verb("sword to bob", &f.player_id, &session));
        assert!(f.executed().is_empty());
    }

    #[test]
    fn test_quoted_arguments_stay_one_token() {
        let f = fixture();
        f.add_verb(VerbOwner::Object(f.room_id.clone()), "say", "*", "say-code");

        assert!(f.run("say \"hello there everyone\""));
        assert_eq!(f.executed()[0].0, "say-code");
    }

    #[test]
    fn test_executor_failure_still_counts_as_handled() {
        let f = fixture_with(RecordingExecutor {
            fail_with: Some("boom".to_string()),
            ..Default::default()
        });
        f.add_verb(VerbOwner::Object(f.room_id.clone()), "look", "", "look-code");

        let session = RecordingSession::default();
        assert!(
            f.dispatcher
                .try_execute_verb("look", &f.player_id, &session)
        );
        let sent = session.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("look"));
    }

    #[test]
    fn test_unknown_command_is_unhandled() {
        let f = fixture();
        assert!(!f.run("frobnicate wildly"));
        assert!(!f.run(""));
        assert!(!f.run("   "));
        assert!(f.executed().is_empty());
    }

    #[test]
    fn test_locationless_player_still_reaches_own_and_system_verbs() {
        let f = fixture();
        f.objects.move_object(&f.player_id, None).unwrap();
        f.add_verb(VerbOwner::Object(f.player_id.clone()), "inventory", "", "inv");

        assert!(f.run("inventory"));
        assert_eq!(f.executed()[0].0, "inv");
    }

    #[test]
    fn test_missing_player_is_swallowed() {
        let f = fixture();
        let session = NoopSession::new("s");
        assert!(
            !f.dispatcher
                .try_execute_verb("look", &ObjId::mk("nobody"), &session)
        );
    }

    #[test]
    fn test_dispatch_errors_reach_the_player() {
        let f = fixture();
        f.objects.destroy_object(&f.player_id).unwrap();

        let session = RecordingSession::default();
        assert!(
            !f.dispatcher
                .try_execute_verb("look", &f.player_id, &session)
        );
        assert!(f.executed().is_empty());
        let sent = session.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("went wrong"));
    }
}
