//! Domain -> wire conversions.

use chrono::TimeDelta;

use agora_core::domain::{Capabilities, PostActions, PublishCountdown, User};
use agora_core::services::ClassifiedPost;
use agora_shared::dto::{
    CapabilitiesResponse, CountdownResponse, PostActionsResponse, PostResponse, ProfileResponse,
    UserResponse,
};

use crate::middleware::error::AppResult;

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        handle: user.handle.clone(),
        level: user.level,
        created_at: user.created_at,
    }
}

pub fn profile_response(user: &User) -> AppResult<ProfileResponse> {
    let caps = Capabilities::for_level(user.level()?);
    Ok(ProfileResponse {
        user: user_response(user),
        capabilities: CapabilitiesResponse {
            create_post: caps.create_post,
            bookmark_or_share: caps.bookmark_or_share,
            verify_others: caps.verify_others,
            manage_user_levels: caps.manage_user_levels,
            access_user_management: caps.access_user_management,
            admin_delete: caps.admin_delete,
            assignable_levels: caps.assignable_levels.into_iter().map(i16::from).collect(),
        },
    })
}

pub fn post_response(classified: ClassifiedPost) -> PostResponse {
    let ClassifiedPost {
        post,
        classification,
        bookmarked,
    } = classified;

    PostResponse {
        id: post.id,
        author_id: post.user_id,
        status_code: post.status_code,
        status: classification.display_status.label().to_string(),
        publish_at: post.publish_at(),
        created_at: post.created_at,
        updated_at: post.updated_at,
        content: post.content,
        countdown: countdown_response(classification.countdown),
        actions: actions_response(classification.actions),
        bookmarked,
        is_repost: false,
    }
}

fn countdown_response(countdown: PublishCountdown) -> CountdownResponse {
    match countdown {
        PublishCountdown::NotScheduled => CountdownResponse::NotScheduled,
        PublishCountdown::Remaining(left) => CountdownResponse::Remaining {
            remaining_seconds: whole_seconds_up(left),
        },
        PublishCountdown::AwaitingPublication => CountdownResponse::AwaitingPublication,
    }
}

/// Round up so a post is never shown "0 seconds" before it is due.
fn whole_seconds_up(left: TimeDelta) -> i64 {
    let millis = left.num_milliseconds();
    (millis + 999).div_euclid(1000)
}

fn actions_response(actions: PostActions) -> PostActionsResponse {
    PostActionsResponse {
        can_edit: actions.can_edit,
        can_withdraw: actions.can_withdraw,
        can_repost: actions.can_repost,
        can_delete: actions.can_delete,
        can_report: actions.can_report,
        show_menu: actions.show_menu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_seconds_round_up() {
        assert_eq!(whole_seconds_up(TimeDelta::milliseconds(1)), 1);
        assert_eq!(whole_seconds_up(TimeDelta::seconds(90)), 90);
        assert_eq!(whole_seconds_up(TimeDelta::milliseconds(90_001)), 91);
    }
}
