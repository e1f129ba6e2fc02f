//! Fixed instructions sent to the model

/// System prompt of the staged agent: formulate a mathematical model.
pub const FORMULATION_SYSTEM: &str = "You are an operations research expert. Based on the optimization problem \
provided by the user, construct a mathematical model that effectively \
models the original problem using mathematical (linear programming) expressions.\n\n\
Follow these steps:\n\
1. Identify the decision variables and clearly define what each variable represents\n\
2. Formulate the objective function (min or max)\n\
3. List all constraints with clear mathematical expressions\n\
4. Specify any bounds or restrictions on variables\n\n\
Focus on obtaining a correct mathematical model expression without too \
much concern for explanations. This model will be used later to guide \
the generation of Gurobi code, and this step is mainly used to generate \
effective linear scale expressions.";

/// Ask the model to audit its own formulation.
pub const AUDIT: &str = "Please verify whether the above mathematical model correctly and completely \
represents the original problem stated earlier in natural language.\n\n\
Specifically:\n\
1. **Check correctness** of the objective function, constraints, variables, and sets.\n\
2. **Identify and fix any errors, omissions, or misinterpretations** from the original problem.\n\
3. If the model is already correct, check if it can be **simplified or written more concisely**.\n\
4. Finally, output the **corrected or optimized mathematical model** in full.\n\n\
Be precise, and think like a mathematical model auditor or a reviewer.";

/// Ask for solver code implementing the audited formulation.
pub const CODE_GENERATION: &str = "Based on the above mathematical model, write complete and reliable Python code using Gurobi to solve \
this operations research optimization problem.\n\n\
Your code must follow this structure:\n\
1. Import necessary libraries (gurobipy, numpy, etc.)\n\
2. Create a model instance\n\
3. Define and add variables with appropriate bounds\n\
4. Set the objective function\n\
5. Add all constraints\n\
6. Optimize the model\n\
7. Extract and print the results, including the optimal objective value\n\
8. Handle potential infeasibility or unboundedness\n\n\
Output in the format ```python\n{code}\n```, without code explanations.";

/// Sent when a run succeeded without reporting a numeric objective.
pub const INFEASIBILITY_REPAIR: &str = "The current model resulted in *no feasible solution*. This indicates one of these issues:\n\
1. Contradictory constraints making the problem infeasible\n\
2. Incorrect variable bounds\n\
3. Errors in constraint formulation\n\n\
Please carefully analyze the mathematical model and Gurobi code. Add diagnostic code to identify \
which constraints are causing infeasibility. Then fix the issues and provide the complete corrected code.\n\n\
Output in the format ```python\n{code}\n```, without code explanations.";

/// Sent when the first stage ran out of attempts.
pub const SYNTAX_REBUILD: &str = "The model code still reports errors after multiple debugging attempts. Here are common issues to address:\n\
1. Check for syntax errors or undefined variables\n\
2. Ensure all constraints use proper Gurobi syntax (e.g., model.addConstr() not just expressions)\n\
3. Verify that all mathematical operations are valid (e.g., no division by zero)\n\
4. Confirm that variable types match their usage (continuous vs. integer vs. binary)\n\n\
Please completely rebuild the Gurobi Python code with careful attention to these details.\n\
Output in the format ```python\n{code}\n```, without code explanations.";

/// System prompt of the single-shot variant: model and code in one reply.
pub const SIMPLE_SYSTEM: &str = "You are an operations research expert. Based on the optimization problem provided by the user, construct a mathematical \
model and write complete, reliable Python code using Gurobi to solve the operations research optimization problem.\
The code should include necessary model construction, variable definitions, constraint additions, objective function \
settings, as well as solving and result output.\
Output in the format ```python\n{code}\n```, without code explanations.";

/// Repair instruction quoting the raw error text of the failed run.
pub fn repair(error: &str) -> String {
    format!(
        "Code execution encountered an error, error message is as follows:\n{}\nPlease fix the code and provide the complete executable code again.",
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_quotes_error_verbatim() {
        let text = repair("NameError: name 'gp' is not defined");
        assert!(text.starts_with("Code execution encountered an error"));
        assert!(text.contains("\nNameError: name 'gp' is not defined\n"));
    }

    #[test]
    fn test_code_prompts_request_python_fence() {
        for prompt in [CODE_GENERATION, INFEASIBILITY_REPAIR, SYNTAX_REBUILD, SIMPLE_SYSTEM] {
            assert!(prompt.contains("```python"));
        }
    }
}
