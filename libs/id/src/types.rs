//! Typed ID definitions for scheduling entities.

use crate::{define_name_id, define_uuid_id};

// =============================================================================
// Sessions and Kernels
// =============================================================================

define_uuid_id!(SessionId);
define_uuid_id!(KernelId);

// =============================================================================
// Agents and Keypairs
// =============================================================================

define_name_id!(AgentId, "agent id");
define_name_id!(AccessKey, "access key");

// =============================================================================
// Tests
// =============================================================================
